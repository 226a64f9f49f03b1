//! The extraction pipeline: SQL text to typed, per-table row data
//!
//! Data flows strictly forward: raw text → statements → tuples → fields →
//! validated rows → typed cells. Per-row failures are collected as
//! diagnostics for the caller and never abort a run.

pub mod assembler;
pub mod coerce;
pub mod scanner;
pub mod tuple;
pub mod value;

pub use assembler::{Assembler, Extraction, SkipReason, SkippedRow, TableData};
pub use coerce::{CellValue, SheetData, coerce_table};
pub use scanner::{InsertStatement, InsertStatements};
pub use tuple::split_tuples;
pub use value::{ParseError, parse_fields};

/// Run the full extraction over one SQL document.
pub fn extract_tables(sql: &str) -> Extraction {
    let mut assembler = Assembler::new();

    for stmt in InsertStatements::new(sql) {
        log::debug!("[{}] statement with {} columns", stmt.table, stmt.columns.len());
        assembler.check_columns(&stmt);

        for raw in split_tuples(stmt.tuple_block) {
            let body = &raw[1..raw.len() - 1];
            assembler.push_row(&stmt, raw, parse_fields(body));
        }
    }

    assembler.finish()
}
