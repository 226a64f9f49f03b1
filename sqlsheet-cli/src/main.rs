//! SQL INSERT dump to Excel workbook converter

mod cli;
mod excel;
mod extract;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Cli::parse();
    cli::handle_convert(args)
}
