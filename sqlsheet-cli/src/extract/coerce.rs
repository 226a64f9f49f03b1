//! Column type coercion and cell sanitization
//!
//! Coercion is per column and all-or-nothing: a single cell that fails
//! numeric parsing keeps the whole column as strings, since spreadsheet
//! columns are expected to be homogeneously typed.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::assembler::TableData;

/// Runs of ASCII control characters collapse to a single space
static CONTROL_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x00-\x1F]+").unwrap());

/// A typed spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Rectangular, typed data for one worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Coerce a table's columns and sanitize its string cells.
///
/// A column becomes numeric only when every one of its cells parses as a
/// number; otherwise all its cells stay strings with control-character
/// runs collapsed to a single space. Numeric cells are never sanitized.
pub fn coerce_table(table: TableData) -> SheetData {
    let numeric: Vec<bool> = (0..table.columns.len())
        .map(|col| table.rows.iter().all(|row| parse_number(&row[col]).is_some()))
        .collect();

    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(col, cell)| match parse_number(&cell) {
                    Some(n) if numeric[col] => n,
                    _ => CellValue::Str(sanitize(&cell)),
                })
                .collect()
        })
        .collect();

    SheetData {
        name: table.name,
        columns: table.columns,
        rows,
    }
}

/// Parse a raw cell as an integer or float. Non-finite floats are
/// rejected since a spreadsheet cell cannot hold them.
fn parse_number(raw: &str) -> Option<CellValue> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Some(CellValue::Int(i));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(CellValue::Float)
}

fn sanitize(raw: &str) -> String {
    CONTROL_RUN.replace_all(raw, " ").into_owned()
}
