// ABOUTME: Writes a Table into a workbook sheet, replacing any sheet of that name.
// ABOUTME: The workbook is re-read and saved whole, keeping other sheets' values, formulas and dates.

use std::path::Path;

use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet, XlsxError};

use super::{SheetCells, read_all_sheets};
use crate::adapter::WriteSummary;
use crate::error::{SinkError, SourceError};
use crate::table::{CellValue, Table};

const MAX_COLUMNS: usize = 16_384;
const MAX_SHEET_NAME_CHARS: usize = 31;
const FORBIDDEN_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

fn check_sheet_name(name: &str) -> Result<(), SinkError> {
    let problem = if name.trim().is_empty() {
        "sheet name is empty"
    } else if name.chars().count() > MAX_SHEET_NAME_CHARS {
        "sheet name is longer than 31 characters"
    } else if name.contains(FORBIDDEN_SHEET_NAME_CHARS) {
        "sheet name contains one of []:*?/\\"
    } else if name.starts_with('\'') || name.ends_with('\'') {
        "sheet name starts or ends with an apostrophe"
    } else {
        return Ok(());
    };
    Err(SinkError::Write(format!("invalid sheet name '{}': {}", name, problem)))
}

/// Write `table` as sheet `sheet_name` of the `.xlsx` workbook at `path`.
///
/// An existing sheet with the same name (compared case-insensitively, as
/// Excel does) is replaced in place; a new one is appended after the others.
/// A missing file is created.
pub fn write_sheet(path: &Path, sheet_name: &str, table: &Table) -> Result<WriteSummary, SinkError> {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        return Err(SinkError::Write(format!(
            "only .xlsx workbooks can be written, got {}",
            path.display()
        )));
    }
    check_sheet_name(sheet_name)?;
    if table.column_count() > MAX_COLUMNS {
        return Err(SinkError::Write(format!(
            "{} columns exceed the worksheet limit of {}",
            table.column_count(),
            MAX_COLUMNS
        )));
    }

    let mut sheets = match read_all_sheets(path) {
        Ok(sheets) => sheets,
        Err(SourceError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(SinkError::Write(e.to_string())),
    };

    let replacement = SheetCells::values(sheet_name, table.to_grid());
    let wanted = sheet_name.to_lowercase();
    match sheets.iter_mut().find(|s| s.name.to_lowercase() == wanted) {
        Some(existing) => *existing = replacement,
        None => sheets.push(replacement),
    }

    let mut workbook = Workbook::new();
    for sheet in &sheets {
        let worksheet = workbook.add_worksheet();
        fill(worksheet, sheet).map_err(|e| write_error(path, &sheet.name, e))?;
    }
    workbook
        .save(path)
        .map_err(|e| write_error(path, sheet_name, e))?;

    tracing::debug!(
        path = %path.display(),
        sheet = sheet_name,
        rows = table.row_count(),
        "wrote workbook sheet"
    );

    Ok(WriteSummary {
        rows_written: table.row_count(),
        sheet_name: sheet_name.to_string(),
    })
}

fn fill(worksheet: &mut Worksheet, sheet: &SheetCells) -> Result<(), XlsxError> {
    worksheet.set_name(&sheet.name)?;
    let (top, left) = sheet.origin;
    for (r, row) in sheet.grid.iter().enumerate() {
        let r = top + r as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = (left as usize + c) as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                CellValue::Int(i) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                CellValue::Float(f) => {
                    worksheet.write_number(r, c, *f)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
            }
        }
    }

    // Later writes to a cell replace earlier ones.
    for (&(r, c), date) in &sheet.dates {
        let format = Format::new().set_num_format(date.num_format());
        worksheet.write_number_with_format(r, c as u16, date.serial, &format)?;
    }
    for (&(r, c), text) in &sheet.formulas {
        let date = sheet.dates.get(&(r, c));
        let cached = match (date, sheet.value_at(r, c)) {
            (Some(date), _) => date.serial.to_string(),
            (None, Some(CellValue::Bool(b))) => b.to_string().to_uppercase(),
            (None, Some(value)) => value.to_string(),
            (None, None) => String::new(),
        };
        let formula = Formula::new(text).set_result(cached);
        match date {
            Some(date) => {
                let format = Format::new().set_num_format(date.num_format());
                worksheet.write_formula_with_format(r, c as u16, formula, &format)?;
            }
            None => {
                worksheet.write_formula(r, c as u16, formula)?;
            }
        }
    }
    Ok(())
}

fn write_error(path: &Path, sheet: &str, e: XlsxError) -> SinkError {
    SinkError::Write(format!("sheet '{}' in {}: {}", sheet, path.display(), e))
}
