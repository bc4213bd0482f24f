//! SQL emission for rename mappings.
//!
//! Each non-empty [`RenameMap`] becomes one `UPDATE ... SET col = CASE col
//! ... END WHERE col IN (...)` statement touching only rows that hold one of
//! the mapped values. Values are written as single-quoted literals with
//! embedded quotes doubled; table and column names are trusted and emitted
//! as given.

use std::fmt::{self, Write as _};

use itertools::Itertools;

use crate::canonical::RenameMap;

pub const SCRIPT_HEADER: [&str; 3] = [
    "-- Update script generated by csv-canon",
    "-- Run this script with auto-commit disabled.",
    "-- Review the changes, then COMMIT or ROLLBACK.",
];

/// A rendered bulk update for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteStatement {
    table: String,
    column: String,
    corrections: usize,
    sql: String,
}

impl RewriteStatement {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Number of `WHEN` branches in the statement.
    pub fn corrections(&self) -> usize {
        self.corrections
    }

    pub fn as_sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Display for RewriteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Quotes `value` as a SQL string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders the update for `column`, or `None` when there is nothing to rename.
pub fn emit(table: &str, column: &str, renames: &RenameMap) -> Option<RewriteStatement> {
    if renames.is_empty() {
        return None;
    }

    let mut sql = String::new();
    let _ = writeln!(sql, "-- Corrections for column: {column}");
    let _ = writeln!(sql, "UPDATE {table}");
    let _ = writeln!(sql, "SET {column} = CASE {column}");
    for rename in renames {
        let _ = writeln!(
            sql,
            "    WHEN {} THEN {}",
            quote_literal(&rename.from),
            quote_literal(&rename.to)
        );
    }
    let _ = writeln!(sql, "    ELSE {column}");
    let _ = writeln!(sql, "END");
    let targets = renames
        .iter()
        .map(|rename| quote_literal(&rename.from))
        .join(", ");
    let _ = write!(sql, "WHERE {column} IN ({targets});");

    Some(RewriteStatement {
        table: table.to_string(),
        column: column.to_string(),
        corrections: renames.len(),
        sql,
    })
}

/// Joins the script header and `statements` with blank lines.
///
/// Returns `None` when no statement was produced.
pub fn assemble_script(statements: &[RewriteStatement]) -> Option<String> {
    if statements.is_empty() {
        return None;
    }
    let header = SCRIPT_HEADER.join("\n");
    let body = statements.iter().map(RewriteStatement::as_sql).join("\n\n");
    Some(format!("{header}\n\n{body}\n"))
}
