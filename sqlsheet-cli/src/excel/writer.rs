//! Write extracted tables to an Excel workbook

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::extract::{CellValue, SheetData};

/// Characters Excel forbids in sheet names
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME_LEN: usize = 31;

/// Write one worksheet per table to `path`.
///
/// Sheet names come from the table names, sanitized for Excel's rules.
/// The first row of each sheet holds the column headers in declared
/// order; data rows follow in insertion order. The workbook is
/// serialized to a buffer and moved into place through a temporary
/// sibling file, so a failed run never leaves a truncated artifact.
pub fn write_workbook(sheets: &[SheetData], path: &Path) -> Result<()> {
    let mut workbook = build_workbook(sheets)?;

    let buffer = workbook
        .save_to_buffer()
        .context("Failed to serialize workbook")?;

    let tmp = path.with_extension("xlsx.tmp");
    fs::write(&tmp, &buffer)
        .with_context(|| format!("Failed to write temporary file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move workbook into place: {}", path.display()))?;

    Ok(())
}

fn build_workbook(sheets: &[SheetData]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();

    for sheet in sheets {
        let name = sheet_name(&sheet.name, &used_names);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_sheet(worksheet, sheet)?;
        used_names.insert(name);
    }

    Ok(workbook)
}

fn write_sheet(ws: &mut Worksheet, sheet: &SheetData) -> Result<()> {
    for (col, name) in sheet.columns.iter().enumerate() {
        ws.write_string(0, col as u16, name)?;
    }

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(ws, row_num, col_idx as u16, cell)?;
        }
    }

    Ok(())
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<()> {
    match cell {
        CellValue::Str(s) => {
            ws.write_string(row, col, s)?;
        }
        CellValue::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
    }
    Ok(())
}

/// Sanitize a table name into a legal, unused sheet name: forbidden
/// characters become `_`, names are cut to 31 chars, collisions get a
/// numeric suffix.
fn sheet_name(table: &str, used: &HashSet<String>) -> String {
    let base: String = table
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let base = base.trim_matches('\'').to_string();
    let base = if base.is_empty() { "Sheet".to_string() } else { base };

    if !used.contains(&base) {
        return base;
    }

    let mut n = 2;
    loop {
        let suffix = format!("_{}", n);
        let mut candidate: String = base
            .chars()
            .take(MAX_SHEET_NAME_LEN - suffix.len())
            .collect();
        candidate.push_str(&suffix);
        if !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
