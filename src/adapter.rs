// ABOUTME: Sheet references plus the load / filter / write pipeline shared by tools.
// ABOUTME: Routes each reference to the workbook or Google Sheets implementation.

use std::fmt;
use std::path::PathBuf;

use crate::error::{SheetError, SinkError, SourceError};
use crate::filter;
use crate::gsheet::{self, RemoteSheets};
use crate::table::{PREVIEW_ROWS, Table};
use crate::workbook;

/// Where a table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRef {
    /// A sheet of a local workbook. `None` is the first sheet.
    Workbook { path: PathBuf, sheet: Option<String> },
    /// A tab of a remote spreadsheet. `None` is the first tab.
    Remote {
        spreadsheet_id: String,
        tab: Option<String>,
    },
}

impl SheetRef {
    /// Reference a workbook sheet.
    pub fn workbook(path: impl Into<PathBuf>, sheet: Option<&str>) -> Self {
        Self::Workbook {
            path: path.into(),
            sheet: sheet.map(str::to_string),
        }
    }

    /// Reference a remote spreadsheet tab.
    pub fn remote(spreadsheet_id: impl Into<String>, tab: Option<&str>) -> Self {
        Self::Remote {
            spreadsheet_id: spreadsheet_id.into(),
            tab: tab.map(str::to_string),
        }
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook { path, sheet } => {
                write!(f, "{}", path.display())?;
                match sheet {
                    Some(sheet) => write!(f, " [{}]", sheet),
                    None => Ok(()),
                }
            }
            Self::Remote {
                spreadsheet_id,
                tab,
            } => {
                write!(f, "gsheet:{}", spreadsheet_id)?;
                match tab {
                    Some(tab) => write!(f, " [{}]", tab),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows_written: usize,
    pub sheet_name: String,
}

/// Load the referenced sheet.
pub async fn load(source: &SheetRef, remote: &RemoteSheets) -> Result<Table, SourceError> {
    match source {
        SheetRef::Workbook { path, sheet } => workbook::load_sheet(path, sheet.as_deref()),
        SheetRef::Remote {
            spreadsheet_id,
            tab,
        } => {
            let api = remote.api().ok_or_else(|| {
                SourceError::Unavailable("Google Sheets not configured".into())
            })?;
            gsheet::load_tab(api, spreadsheet_id, tab.as_deref()).await
        }
    }
}

/// Write `table` as `sheet_name` in the workbook or spreadsheet of `destination`.
pub async fn write(
    destination: &SheetRef,
    sheet_name: &str,
    table: &Table,
    remote: &RemoteSheets,
) -> Result<WriteSummary, SinkError> {
    match destination {
        SheetRef::Workbook { path, .. } => workbook::write_sheet(path, sheet_name, table),
        SheetRef::Remote { spreadsheet_id, .. } => {
            let api = remote
                .api()
                .ok_or_else(|| SinkError::Unavailable("Google Sheets not configured".into()))?;
            gsheet::write_tab(api, spreadsheet_id, sheet_name, table).await
        }
    }
}

/// Load a sheet and render its column list and first rows.
pub async fn preview(source: &SheetRef, remote: &RemoteSheets) -> Result<String, SheetError> {
    let table = load(source, remote).await?;
    Ok(table.preview(PREVIEW_ROWS))
}

/// Load `source`, keep the rows matching `condition`, and write them to
/// `new_sheet` next to the source. Nothing is written if the filter fails.
pub async fn filter_and_write(
    source: &SheetRef,
    condition: &str,
    new_sheet: &str,
    remote: &RemoteSheets,
) -> Result<WriteSummary, SheetError> {
    let table = load(source, remote).await?;
    let filtered = filter::filter(&table, condition)?;
    tracing::debug!(
        %source,
        condition,
        kept = filtered.row_count(),
        total = table.row_count(),
        "filtered sheet"
    );
    Ok(write(source, new_sheet, &filtered, remote).await?)
}
