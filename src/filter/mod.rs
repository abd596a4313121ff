// ABOUTME: Filter module - parses query strings and keeps the matching rows.
// ABOUTME: Expressions are parsed once, bound to the header, then run per row.

mod expr;
mod lexer;
mod parser;

pub use expr::*;
pub use parser::parse;

use crate::error::FilterError;
use crate::table::Table;

/// Keep the rows of `table` for which `expression` is true.
///
/// Column and row order are preserved. Unknown columns are rejected before
/// any row is evaluated.
pub fn filter(table: &Table, expression: &str) -> Result<Table, FilterError> {
    let expr = parse(expression)?;
    let bound = expr.bind(table)?;
    Ok(table.retain_rows(|row| bound.matches(row)))
}
