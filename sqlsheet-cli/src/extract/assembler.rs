//! Row accumulation and skip diagnostics
//!
//! Parse results flow in per tuple; validated rows accumulate per table
//! and everything rejected is collected as a structured diagnostic for
//! the caller to surface. A bad tuple never aborts a run.

use std::fmt;

use indexmap::IndexMap;

use super::scanner::InsertStatement;
use super::value::ParseError;

/// Accumulated raw rows for one output table.
///
/// Columns are fixed from the first statement seen for the table; every
/// stored row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Why a tuple was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The tuple text failed structural parsing
    Parse(ParseError),
    /// The field count disagrees with the table's column count
    Arity {
        columns: Vec<String>,
        values: Vec<String>,
    },
}

/// One dropped tuple, kept for the caller to surface
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub table: String,
    pub tuple: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::Parse(err) => {
                write!(
                    f,
                    "[{}] tuple parse error for {:?}: {}",
                    self.table, self.tuple, err
                )
            }
            SkipReason::Arity { columns, values } => {
                write!(
                    f,
                    "[{}] skipping row: {} cols vs {} vals (columns: {:?}, values: {:?})",
                    self.table,
                    columns.len(),
                    values.len(),
                    columns,
                    values
                )
            }
        }
    }
}

/// Everything extracted from one SQL document: the accumulated tables in
/// first-encounter order, plus the rows that were dropped along the way.
#[derive(Debug, Default)]
pub struct Extraction {
    pub tables: Vec<TableData>,
    pub skipped: Vec<SkippedRow>,
}

/// Accumulates validated rows per table and collects skip diagnostics
#[derive(Default)]
pub struct Assembler {
    tables: IndexMap<String, TableData>,
    skipped: Vec<SkippedRow>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn when a later statement re-declares a table with a different
    /// column list; the first declaration stays authoritative.
    pub fn check_columns(&mut self, stmt: &InsertStatement<'_>) {
        if let Some(existing) = self.tables.get(&stmt.table) {
            if existing.columns != stmt.columns {
                log::warn!(
                    "[{}] column list {:?} differs from first declaration {:?}; keeping the first",
                    stmt.table,
                    stmt.columns,
                    existing.columns
                );
            }
        }
    }

    /// Append a validated row, or record why the tuple was dropped.
    ///
    /// The accumulator for a table is created lazily on its first valid
    /// row; arity is checked against the fixed columns once one exists.
    pub fn push_row(
        &mut self,
        stmt: &InsertStatement<'_>,
        raw_tuple: &str,
        parsed: Result<Vec<String>, ParseError>,
    ) {
        let values = match parsed {
            Ok(values) => values,
            Err(err) => {
                self.skipped.push(SkippedRow {
                    table: stmt.table.clone(),
                    tuple: raw_tuple.to_string(),
                    reason: SkipReason::Parse(err),
                });
                return;
            }
        };

        let expected = self
            .tables
            .get(&stmt.table)
            .map(|t| t.columns.len())
            .unwrap_or(stmt.columns.len());
        if values.len() != expected {
            let columns = self
                .tables
                .get(&stmt.table)
                .map(|t| t.columns.clone())
                .unwrap_or_else(|| stmt.columns.clone());
            self.skipped.push(SkippedRow {
                table: stmt.table.clone(),
                tuple: raw_tuple.to_string(),
                reason: SkipReason::Arity { columns, values },
            });
            return;
        }

        self.tables
            .entry(stmt.table.clone())
            .or_insert_with(|| TableData {
                name: stmt.table.clone(),
                columns: stmt.columns.clone(),
                rows: Vec::new(),
            })
            .rows
            .push(values);
    }

    pub fn finish(self) -> Extraction {
        Extraction {
            tables: self.tables.into_values().collect(),
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement<'a>(table: &str, columns: &[&str]) -> InsertStatement<'a> {
        InsertStatement {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            tuple_block: "",
        }
    }

    #[test]
    fn test_valid_row_is_appended() {
        let stmt = statement("t", &["a", "b"]);
        let mut assembler = Assembler::new();
        assembler.push_row(&stmt, "(1, 'x')", Ok(vec!["1".into(), "x".into()]));

        let extraction = assembler.finish();
        assert_eq!(extraction.tables.len(), 1);
        assert_eq!(extraction.tables[0].rows, vec![vec!["1", "x"]]);
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_arity_mismatch_is_skipped_not_fatal() {
        let stmt = statement("t", &["a", "b"]);
        let mut assembler = Assembler::new();
        assembler.push_row(&stmt, "(1, 'x')", Ok(vec!["1".into(), "x".into()]));
        assembler.push_row(&stmt, "(1, 2, 3)", Ok(vec!["1".into(), "2".into(), "3".into()]));

        let extraction = assembler.finish();
        assert_eq!(extraction.tables[0].rows.len(), 1);
        assert_eq!(extraction.skipped.len(), 1);
        match &extraction.skipped[0].reason {
            SkipReason::Arity { columns, values } => {
                assert_eq!(columns.len(), 2);
                assert_eq!(values.len(), 3);
            }
            other => panic!("expected arity skip, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_is_recorded_and_skipped() {
        let stmt = statement("t", &["a"]);
        let mut assembler = Assembler::new();
        assembler.push_row(
            &stmt,
            "('oops)",
            Err(ParseError {
                message: "unclosed string literal".to_string(),
                position: 0,
                context: "'oops".to_string(),
            }),
        );

        let extraction = assembler.finish();
        assert!(extraction.tables.is_empty());
        assert_eq!(extraction.skipped.len(), 1);
        assert!(matches!(extraction.skipped[0].reason, SkipReason::Parse(_)));
    }

    #[test]
    fn test_accumulator_created_lazily_on_first_valid_row() {
        let stmt = statement("t", &["a", "b"]);
        let mut assembler = Assembler::new();
        assembler.push_row(&stmt, "(1)", Ok(vec!["1".into()]));

        let extraction = assembler.finish();
        assert!(extraction.tables.is_empty());
        assert_eq!(extraction.skipped.len(), 1);
    }

    #[test]
    fn test_rows_accumulate_across_statements_with_first_columns() {
        let first = statement("t", &["a", "b"]);
        let second = statement("t", &["x", "y"]);
        let mut assembler = Assembler::new();
        assembler.push_row(&first, "(1, 2)", Ok(vec!["1".into(), "2".into()]));
        assembler.push_row(&second, "(3, 4)", Ok(vec!["3".into(), "4".into()]));

        let extraction = assembler.finish();
        assert_eq!(extraction.tables.len(), 1);
        assert_eq!(extraction.tables[0].columns, vec!["a", "b"]);
        assert_eq!(extraction.tables[0].rows.len(), 2);
    }

    #[test]
    fn test_tables_keep_first_encounter_order() {
        let mut assembler = Assembler::new();
        assembler.push_row(&statement("b", &["x"]), "(1)", Ok(vec!["1".into()]));
        assembler.push_row(&statement("a", &["x"]), "(2)", Ok(vec!["2".into()]));
        assembler.push_row(&statement("b", &["x"]), "(3)", Ok(vec!["3".into()]));

        let names: Vec<String> = assembler.finish().tables.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_skip_diagnostic_mentions_counts() {
        let stmt = statement("t", &["a", "b"]);
        let mut assembler = Assembler::new();
        assembler.push_row(&stmt, "(1)", Ok(vec!["1".into()]));

        let line = assembler.finish().skipped[0].to_string();
        assert!(line.contains("[t]"));
        assert!(line.contains("2 cols vs 1 vals"));
    }
}
