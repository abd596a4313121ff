// ABOUTME: Loads workbook sheets into Tables and raw cell grids.
// ABOUTME: Maps calamine cell types onto CellValue.

use std::collections::HashMap;
use std::path::Path;

use calamine::{Data, ExcelDateTime, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::SourceError;
use crate::table::{CellValue, Table};

/// Every cell of one sheet, anchored at its first used cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCells {
    pub name: String,
    /// Zero-based (row, column) of `grid[0][0]`.
    pub origin: (u32, u32),
    pub grid: Vec<Vec<CellValue>>,
    /// Formula text (without `=`) keyed by absolute (row, column).
    pub formulas: HashMap<(u32, u32), String>,
    /// Date and time cells keyed by absolute (row, column).
    pub dates: HashMap<(u32, u32), DateCell>,
}

impl SheetCells {
    /// A sheet holding plain values only.
    pub fn values(name: impl Into<String>, grid: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            origin: (0, 0),
            grid,
            formulas: HashMap::new(),
            dates: HashMap::new(),
        }
    }

    /// The value at absolute (row, column), if it lies inside the grid.
    pub fn value_at(&self, row: u32, col: u32) -> Option<&CellValue> {
        let (top, left) = self.origin;
        let r = row.checked_sub(top)? as usize;
        let c = col.checked_sub(left)? as usize;
        self.grid.get(r)?.get(c)
    }
}

/// A date, time or duration cell as a serial in the 1900 date system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateCell {
    pub serial: f64,
    pub kind: DateKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Date,
    DateTime,
    Time,
    Duration,
}

impl DateCell {
    fn from_excel(dt: &ExcelDateTime) -> Self {
        if dt.is_duration() {
            return Self {
                serial: dt.as_f64(),
                kind: DateKind::Duration,
            };
        }
        let serial = dt.as_datetime().map(serial_1900).unwrap_or_else(|| dt.as_f64());
        let kind = if serial < 1.0 {
            DateKind::Time
        } else if serial.fract() == 0.0 {
            DateKind::Date
        } else {
            DateKind::DateTime
        };
        Self { serial, kind }
    }

    /// Excel number format that reads back as the same kind of cell.
    pub fn num_format(&self) -> &'static str {
        match self.kind {
            DateKind::Date => "yyyy-mm-dd",
            DateKind::DateTime => "yyyy-mm-dd hh:mm:ss",
            DateKind::Time => "hh:mm:ss",
            DateKind::Duration => "[h]:mm:ss",
        }
    }
}

// Inverse of calamine's serial to timestamp mapping, including the phantom
// 1900-02-29. Normalises 1904-system workbooks to the 1900 system.
fn serial_1900(ts: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN);
    let serial = (ts - epoch).num_milliseconds() as f64 / 86_400_000.0;
    if serial < 61.0 { serial - 1.0 } else { serial }
}

/// Load one sheet of a workbook as a Table. `None` selects the first sheet.
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<Table, SourceError> {
    let mut workbook = open(path)?;
    let names = workbook.sheet_names();

    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                SourceError::NotFound(format!(
                    "sheet '{}' not found in {} (sheets: {})",
                    wanted,
                    path.display(),
                    names.join(", ")
                ))
            })?,
        None => names.first().cloned().ok_or_else(|| {
            SourceError::NotFound(format!("{} contains no sheets", path.display()))
        })?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| SourceError::Read(format!("sheet '{}' in {}: {}", name, path.display(), e)))?;

    tracing::debug!(path = %path.display(), sheet = %name, "loaded workbook sheet");
    Ok(Table::from_grid(grid(&range)))
}

/// Read every sheet of a workbook in workbook order.
pub fn read_all_sheets(path: &Path) -> Result<Vec<SheetCells>, SourceError> {
    let mut workbook = open(path)?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| SourceError::Read(format!("sheet '{}' in {}: {}", name, path.display(), e)))?;
        let formula_range = workbook
            .worksheet_formula(&name)
            .map_err(|e| SourceError::Read(format!("formulas of sheet '{}' in {}: {}", name, path.display(), e)))?;
        sheets.push(SheetCells {
            origin: range.start().unwrap_or((0, 0)),
            grid: grid(&range),
            formulas: formulas(&formula_range),
            dates: dates(&range),
            name,
        });
    }
    Ok(sheets)
}

fn open(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>, SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound(format!(
            "workbook {} does not exist",
            path.display()
        )));
    }
    open_workbook_auto(path)
        .map_err(|e| SourceError::Read(format!("cannot open {}: {}", path.display(), e)))
}

fn grid(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect()
}

fn formulas(range: &Range<String>) -> HashMap<(u32, u32), String> {
    let (top, left) = range.start().unwrap_or((0, 0));
    range
        .used_cells()
        .map(|(r, c, text)| ((top + r as u32, left + c as u32), text.clone()))
        .collect()
}

fn dates(range: &Range<Data>) -> HashMap<(u32, u32), DateCell> {
    let (top, left) = range.start().unwrap_or((0, 0));
    range
        .used_cells()
        .filter_map(|(r, c, data)| match data {
            Data::DateTime(dt) => Some(((top + r as u32, left + c as u32), DateCell::from_excel(dt))),
            _ => None,
        })
        .collect()
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Int(*i),
        // xlsx stores every number as a double.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => CellValue::Int(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.num_seconds_from_midnight() == 0 => {
                CellValue::Text(ts.format("%Y-%m-%d").to_string())
            }
            Some(ts) => CellValue::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
