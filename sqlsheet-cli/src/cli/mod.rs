//! Command-line interface

mod handler;

pub use handler::handle_convert;

use std::path::PathBuf;

use clap::Parser;

/// Extract tables from a SQL INSERT dump into an Excel workbook
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// SQL dump file to read
    pub sql_file: PathBuf,

    /// Output workbook path (defaults to the input path with .xlsx)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,
}
