// ABOUTME: Defines the SheetsApi trait - the spreadsheet service operations tools need.
// ABOUTME: Implemented by the HTTP client and by the in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SheetsApiError;

/// Properties of one tab of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    /// Numeric tab id. The service omits it when it is 0.
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    /// Position among the tabs. Omitted by the service when it is 0.
    #[serde(default)]
    pub index: i64,
}

/// Raw operations on a remote spreadsheet service.
///
/// Values travel as JSON rows exactly as the service returns them; turning
/// them into tables is left to the adapter functions in this module.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// List the tabs of a spreadsheet.
    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<TabInfo>, SheetsApiError>;

    /// Read every populated cell of a tab, row by row, as unformatted values.
    async fn get_values(
        &self,
        spreadsheet_id: &str,
        tab: &str,
    ) -> Result<Vec<Vec<serde_json::Value>>, SheetsApiError>;

    /// Add a tab with the given grid size.
    async fn add_tab(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: usize,
        columns: usize,
    ) -> Result<TabInfo, SheetsApiError>;

    /// Delete a tab by id.
    async fn delete_tab(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<(), SheetsApiError>;

    /// Write raw values into a tab starting at A1.
    async fn update_values(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        values: Vec<Vec<serde_json::Value>>,
    ) -> Result<(), SheetsApiError>;
}
