// ABOUTME: Google Sheets module - remote tabs as sources and sinks.
// ABOUTME: Holds the injected client handle and the tab load/replace logic.

mod api;
mod auth;
mod client;
mod memory;

pub use api::*;
pub use auth::{SCOPES, ServiceAccount, TokenSource};
pub use client::GoogleSheetsClient;
pub use memory::MemorySheets;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::adapter::WriteSummary;
use crate::error::{ConfigError, SheetsApiError, SinkError, SourceError};
use crate::table::{CellValue, Table};

/// Result text of every remote tool when no client is configured.
pub const NOT_CONFIGURED: &str = "❌ Google Sheets not configured.";

/// Handle to the remote spreadsheet service, decided once at startup.
#[derive(Clone)]
pub enum RemoteSheets {
    Configured(Arc<dyn SheetsApi>),
    NotConfigured,
}

impl RemoteSheets {
    /// Wrap a client.
    pub fn new(api: impl SheetsApi + 'static) -> Self {
        Self::Configured(Arc::new(api))
    }

    /// Build the Google client from a service-account credential file.
    ///
    /// A missing file means the remote tools are not configured. A file that
    /// exists but cannot be used is an error.
    pub fn from_credentials_file(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidCredentials {
            path: path.display().to_string(),
            message,
        };

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "no Google credentials found, Google Sheets tools are disabled"
                );
                return Ok(Self::NotConfigured);
            }
            Err(e) => return Err(invalid(e.to_string())),
        };

        let account = ServiceAccount::from_json(&raw).map_err(invalid)?;
        let client = GoogleSheetsClient::new(account).map_err(|e| invalid(e.to_string()))?;
        tracing::info!(account = client.client_email(), "Google Sheets configured");
        Ok(Self::new(client))
    }

    /// The client, if configured.
    pub fn api(&self) -> Option<&dyn SheetsApi> {
        match self {
            Self::Configured(api) => Some(api.as_ref()),
            Self::NotConfigured => None,
        }
    }

    /// Returns true if a client is available.
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

impl fmt::Debug for RemoteSheets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured(_) => f.write_str("RemoteSheets::Configured"),
            Self::NotConfigured => f.write_str("RemoteSheets::NotConfigured"),
        }
    }
}

fn source_error(spreadsheet_id: &str, e: SheetsApiError) -> SourceError {
    match e {
        SheetsApiError::NotFound(_) => {
            SourceError::NotFound(format!("spreadsheet {} not found", spreadsheet_id))
        }
        SheetsApiError::Auth(message) => SourceError::Unavailable(message),
        other => SourceError::Read(other.to_string()),
    }
}

fn sink_error(spreadsheet_id: &str, e: SheetsApiError) -> SinkError {
    match e {
        SheetsApiError::NotFound(_) => {
            SinkError::Write(format!("spreadsheet {} not found", spreadsheet_id))
        }
        SheetsApiError::Auth(message) => SinkError::Unavailable(message),
        other => SinkError::Write(other.to_string()),
    }
}

/// Load a tab as a Table. `None` selects the first tab.
pub async fn load_tab(
    api: &dyn SheetsApi,
    spreadsheet_id: &str,
    tab: Option<&str>,
) -> Result<Table, SourceError> {
    let tabs = api
        .list_tabs(spreadsheet_id)
        .await
        .map_err(|e| source_error(spreadsheet_id, e))?;

    let title = match tab {
        Some(wanted) => tabs.iter().find(|t| t.title == wanted).ok_or_else(|| {
            SourceError::NotFound(format!(
                "tab '{}' not found in spreadsheet {}",
                wanted, spreadsheet_id
            ))
        })?,
        None => tabs.iter().min_by_key(|t| t.index).ok_or_else(|| {
            SourceError::NotFound(format!("spreadsheet {} has no tabs", spreadsheet_id))
        })?,
    }
    .title
    .clone();

    let values = api
        .get_values(spreadsheet_id, &title)
        .await
        .map_err(|e| source_error(spreadsheet_id, e))?;

    tracing::debug!(spreadsheet_id, tab = %title, rows = values.len(), "loaded Google Sheet tab");
    // Rows come back without their trailing blank cells.
    let width = values.iter().map(Vec::len).max().unwrap_or(0);
    let grid = values
        .iter()
        .map(|row| {
            let mut cells: Vec<CellValue> = row.iter().map(CellValue::from_json).collect();
            cells.resize(width, CellValue::Text(String::new()));
            cells
        })
        .collect();
    Ok(Table::from_grid(grid))
}

/// Replace (or create) tab `title` with `table`, sized to fit it exactly.
pub async fn write_tab(
    api: &dyn SheetsApi,
    spreadsheet_id: &str,
    title: &str,
    table: &Table,
) -> Result<WriteSummary, SinkError> {
    let tabs = api
        .list_tabs(spreadsheet_id)
        .await
        .map_err(|e| sink_error(spreadsheet_id, e))?;

    let wanted = title.to_lowercase();
    let replaced = tabs.iter().find(|t| t.title.to_lowercase() == wanted);
    if let Some(existing) = replaced {
        api.delete_tab(spreadsheet_id, existing.sheet_id)
            .await
            .map_err(|e| sink_error(spreadsheet_id, e))?;
    }

    // Past this point a replaced tab is already gone.
    let after_delete = |e: SheetsApiError| {
        if let Some(old) = replaced {
            tracing::warn!(
                spreadsheet_id,
                tab = %old.title,
                error = %e,
                "write failed after the previous tab was deleted; its contents are lost"
            );
        }
        sink_error(spreadsheet_id, e)
    };

    api.add_tab(
        spreadsheet_id,
        title,
        table.row_count() + 1,
        table.column_count().max(1),
    )
    .await
    .map_err(after_delete)?;

    let values = table
        .to_grid()
        .iter()
        .map(|row| row.iter().map(CellValue::to_json).collect())
        .collect();
    api.update_values(spreadsheet_id, title, values)
        .await
        .map_err(after_delete)?;

    tracing::debug!(spreadsheet_id, tab = title, rows = table.row_count(), "wrote Google Sheet tab");
    Ok(WriteSummary {
        rows_written: table.row_count(),
        sheet_name: title.to_string(),
    })
}
