//! Convert command handler

use std::fs;

use anyhow::{Context, Result};
use colored::*;

use super::Cli;
use crate::excel::write_workbook;
use crate::extract::{SheetData, coerce_table, extract_tables};

/// Run the dump-to-workbook conversion described by the CLI arguments.
pub fn handle_convert(args: Cli) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    if !args.sql_file.exists() {
        anyhow::bail!("SQL file does not exist: {}", args.sql_file.display());
    }

    let sql = fs::read_to_string(&args.sql_file)
        .with_context(|| format!("Failed to read SQL file: {}", args.sql_file.display()))?;

    let extraction = extract_tables(&sql);
    for skip in &extraction.skipped {
        log::warn!("{}", skip);
    }

    let sheets: Vec<SheetData> = extraction.tables.into_iter().map(coerce_table).collect();

    let output = args
        .output
        .unwrap_or_else(|| args.sql_file.with_extension("xlsx"));
    write_workbook(&sheets, &output)?;

    println!(
        "Wrote {} tables to {}",
        sheets.len().to_string().bold(),
        output.display().to_string().bright_green()
    );

    Ok(())
}
