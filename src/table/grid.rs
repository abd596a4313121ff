// ABOUTME: Defines Table - named columns over equally sized rows of cells.
// ABOUTME: Construction normalises headers so column names are always unique.

use std::collections::HashSet;

use super::CellValue;

/// An in-memory sheet: a header of unique column names and rows of cells.
///
/// Every row has exactly one cell per column. Both invariants are enforced
/// at construction, so a `Table` can be written back without re-checking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from a header and data rows.
    ///
    /// Empty header names become `Unnamed: i`, repeated names get a `.N`
    /// suffix, short rows are padded with empty cells and rows wider than
    /// the header add unnamed columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut header: Vec<String> = columns.into_iter().map(Into::into).collect();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(header.len());
        header.resize(width, String::new());

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();

        Self {
            columns: unique_names(header),
            rows,
        }
    }

    /// Build a table from raw sheet cells, taking the first row as the header.
    pub fn from_grid(grid: Vec<Vec<CellValue>>) -> Self {
        let mut grid = grid.into_iter();
        let header: Vec<String> = match grid.next() {
            Some(row) => row.iter().map(|c| c.to_string()).collect(),
            None => return Self::default(),
        };
        Self::new(header, grid.collect())
    }

    /// Column names in sheet order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows, excluding the header.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Keep the rows matching `keep`, preserving column and row order.
    pub fn retain_rows(&self, mut keep: impl FnMut(&[CellValue]) -> bool) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// The header as a row of text cells followed by the data rows.
    pub fn to_grid(&self) -> Vec<Vec<CellValue>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.columns.iter().map(|c| CellValue::Text(c.clone())).collect());
        grid.extend(self.rows.iter().cloned());
        grid
    }
}

fn unique_names(header: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            };

            let mut candidate = base.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                candidate = format!("{}.{}", base, n);
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}
