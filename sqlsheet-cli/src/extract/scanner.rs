//! INSERT statement extraction from raw SQL text
//!
//! Finds every `INSERT INTO <table> (<cols>) VALUES <tuples>;` clause in a
//! dump. A regex only anchors the keyword pair; everything after the anchor
//! is scanned character by character, tracking string-literal state and
//! paren depth, so a `)` or `;` inside a quoted value never cuts a
//! statement short.

use once_cell::sync::Lazy;
use regex::Regex;

static INSERT_INTO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bINSERT\s+INTO\b").unwrap());

/// One `INSERT INTO ... VALUES ...` clause found in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement<'a> {
    /// Table identifier, schema qualifier discarded
    pub table: String,
    /// Column identifiers in declared order, quoting stripped
    pub columns: Vec<String>,
    /// Raw text spanning all value tuples, up to the terminating `;`
    pub tuple_block: &'a str,
}

/// Iterator over the INSERT statements of a SQL document, in source order.
///
/// Anything around the statements (comments, DDL, other DML) is ignored;
/// an anchor not followed by the full `table (cols) VALUES` shape is
/// simply not a statement. A document with no matches yields nothing.
pub struct InsertStatements<'a> {
    sql: &'a str,
    pos: usize,
}

impl<'a> InsertStatements<'a> {
    pub fn new(sql: &'a str) -> Self {
        Self { sql, pos: 0 }
    }
}

impl<'a> Iterator for InsertStatements<'a> {
    type Item = InsertStatement<'a>;

    fn next(&mut self) -> Option<InsertStatement<'a>> {
        loop {
            let anchor = INSERT_INTO.find_at(self.sql, self.pos)?;
            // Resume after the keywords on the next round regardless of
            // whether the rest of the clause matches.
            self.pos = anchor.end();

            let mut cursor = Cursor::new(self.sql, anchor.end());

            let Some(table) = cursor.table_reference() else {
                continue;
            };
            cursor.skip_whitespace();
            let Some(columns) = cursor.column_list() else {
                continue;
            };
            cursor.skip_whitespace();
            if !cursor.keyword("VALUES") {
                continue;
            }

            let tuple_block = cursor.tuple_block();
            self.pos = cursor.pos;

            return Some(InsertStatement {
                table,
                columns,
                tuple_block,
            });
        }
    }
}

/// Character-level scanner over the source document
struct Cursor<'a> {
    sql: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(sql: &'a str, pos: usize) -> Self {
        Self { sql, pos }
    }

    fn rest(&self) -> &'a str {
        &self.sql[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Table reference: `name`, `schema.name`, or either part quoted with
    /// brackets, backticks or double quotes. Only the table identifier is
    /// kept; the schema qualifier is discarded.
    fn table_reference(&mut self) -> Option<String> {
        self.skip_whitespace();
        let first = self.identifier()?;
        self.skip_whitespace();
        if self.eat('.') {
            self.skip_whitespace();
            self.identifier()
        } else {
            Some(first)
        }
    }

    fn identifier(&mut self) -> Option<String> {
        match self.peek()? {
            '[' => self.quoted_identifier(']'),
            '`' => self.quoted_identifier('`'),
            '"' => self.quoted_identifier('"'),
            c if c.is_alphanumeric() || c == '_' => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                    self.bump();
                }
                Some(self.sql[start..self.pos].to_string())
            }
            _ => None,
        }
    }

    fn quoted_identifier(&mut self, close: char) -> Option<String> {
        self.bump();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == close {
                let name = self.sql[start..self.pos].to_string();
                self.bump();
                return Some(name);
            }
            self.bump();
        }
        None
    }

    /// Parse the parenthesized column list after the table reference.
    fn column_list(&mut self) -> Option<Vec<String>> {
        if !self.eat('(') {
            return None;
        }
        let body = self.balanced()?;
        Some(split_columns(body))
    }

    /// Consume up to the `)` matching an already-consumed `(`, honoring
    /// nested parens and single-quoted literals. Returns the inner text.
    fn balanced(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '\'' => self.skip_string_literal(),
                '(' => depth += 1,
                ')' => {
                    if depth == 0 {
                        return Some(&self.sql[start..self.pos - 1]);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }

    /// Consume through the closing quote of a literal whose opening `'`
    /// was already consumed. `''` is an escaped quote and stays inside.
    fn skip_string_literal(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\'' {
                if self.peek() == Some('\'') {
                    self.bump();
                } else {
                    return;
                }
            }
        }
    }

    /// Case-insensitive keyword match, requiring a word boundary after it.
    fn keyword(&mut self, kw: &str) -> bool {
        let Some(head) = self.rest().get(..kw.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(kw) {
            return false;
        }
        let after = self.rest()[kw.len()..].chars().next();
        if matches!(after, Some(c) if c.is_alphanumeric() || c == '_') {
            return false;
        }
        self.pos += kw.len();
        true
    }

    /// Text from the current position up to the first `;` outside any
    /// string literal, or end of input. The terminator is consumed but
    /// not included.
    fn tuple_block(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.bump() {
            match c {
                '\'' => self.skip_string_literal(),
                ';' => return &self.sql[start..self.pos - 1],
                _ => {}
            }
        }
        &self.sql[start..]
    }
}

/// Split a column-list body on top-level commas and strip quoting.
fn split_columns(body: &str) -> Vec<String> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                columns.push(clean_identifier(&body[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    columns.push(clean_identifier(&body[start..]));
    columns
}

fn clean_identifier(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '`' | '"'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(sql: &str) -> Vec<InsertStatement<'_>> {
        InsertStatements::new(sql).collect()
    }

    #[test]
    fn test_simple_statement() {
        let stmts = scan("INSERT INTO t (a, b) VALUES (1, 'x');");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].table, "t");
        assert_eq!(stmts[0].columns, vec!["a", "b"]);
        assert_eq!(stmts[0].tuple_block.trim(), "(1, 'x')");
    }

    #[test]
    fn test_schema_qualifier_discarded() {
        let stmts = scan("INSERT INTO dbo.Users (Id) VALUES (1);");
        assert_eq!(stmts[0].table, "Users");
    }

    #[test]
    fn test_bracket_quoting_stripped() {
        let stmts = scan("INSERT INTO [dbo].[Users] ([Id], [Full Name]) VALUES (1, 'a');");
        assert_eq!(stmts[0].table, "Users");
        assert_eq!(stmts[0].columns, vec!["Id", "Full Name"]);
    }

    #[test]
    fn test_backtick_quoting_stripped() {
        let stmts = scan("INSERT INTO `db`.`t` (`a`) VALUES (1);");
        assert_eq!(stmts[0].table, "t");
        assert_eq!(stmts[0].columns, vec!["a"]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let stmts = scan("insert into t (a) values (1);");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].table, "t");
    }

    #[test]
    fn test_no_statements_yields_nothing() {
        assert!(scan("SELECT * FROM t; -- nothing to extract").is_empty());
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_surrounding_sql_ignored() {
        let sql = "CREATE TABLE t (a int);\nINSERT INTO t (a) VALUES (1);\nDROP TABLE t;";
        let stmts = scan(sql);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].table, "t");
    }

    #[test]
    fn test_semicolon_inside_literal_does_not_terminate() {
        let stmts = scan("INSERT INTO t (a) VALUES ('x;y');");
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].tuple_block.trim(), "('x;y')");
    }

    #[test]
    fn test_paren_inside_literal_does_not_terminate() {
        let stmts = scan("INSERT INTO t (a, b) VALUES ('x)', 2);");
        assert_eq!(stmts[0].tuple_block.trim(), "('x)', 2)");
    }

    #[test]
    fn test_block_runs_to_end_of_input_without_terminator() {
        let stmts = scan("INSERT INTO t (a) VALUES (1), (2)");
        assert_eq!(stmts[0].tuple_block.trim(), "(1), (2)");
    }

    #[test]
    fn test_multiple_statements_in_order() {
        let sql = "INSERT INTO a (x) VALUES (1); INSERT INTO b (y) VALUES (2);";
        let tables: Vec<String> = scan(sql).into_iter().map(|s| s.table).collect();
        assert_eq!(tables, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_values_keyword_is_not_a_statement() {
        let sql = "INSERT INTO t (a) SELECT a FROM u; INSERT INTO t (a) VALUES (1);";
        let stmts = scan(sql);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].tuple_block.trim(), "(1)");
    }

    #[test]
    fn test_values_prefix_identifier_is_not_the_keyword() {
        let stmts = scan("INSERT INTO t (a) VALUESX (1);");
        assert!(stmts.is_empty());
    }
}
