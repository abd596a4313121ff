// ABOUTME: MemorySheets - an in-process SheetsApi with the service's constraints.
// ABOUTME: Used in tests and dry runs in place of the Google client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{SheetsApi, TabInfo};
use crate::error::SheetsApiError;

#[derive(Debug, Clone)]
struct MemoryTab {
    info: TabInfo,
    rows: usize,
    columns: usize,
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Default)]
struct State {
    spreadsheets: HashMap<String, Vec<MemoryTab>>,
    next_sheet_id: i64,
}

/// An in-memory spreadsheet service.
///
/// Like the real service it refuses duplicate tab titles, refuses to delete
/// the last tab of a spreadsheet and refuses writes outside a tab's grid.
#[derive(Debug, Default)]
pub struct MemorySheets {
    state: Mutex<State>,
    calls: AtomicUsize,
}

fn bad_request(message: impl Into<String>) -> SheetsApiError {
    SheetsApiError::Api {
        status: 400,
        message: message.into(),
    }
}

impl MemorySheets {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tab holding `values`, creating the spreadsheet if needed.
    pub async fn insert_tab(
        &self,
        spreadsheet_id: &str,
        title: &str,
        values: Vec<Vec<serde_json::Value>>,
    ) -> TabInfo {
        let mut state = self.state.lock().await;
        let sheet_id = state.next_sheet_id;
        state.next_sheet_id += 1;

        let tabs = state.spreadsheets.entry(spreadsheet_id.to_string()).or_default();
        let info = TabInfo {
            sheet_id,
            title: title.to_string(),
            index: tabs.len() as i64,
        };
        tabs.push(MemoryTab {
            info: info.clone(),
            rows: values.len().max(1000),
            columns: values.iter().map(Vec::len).max().unwrap_or(0).max(26),
            values,
        });
        info
    }

    /// Current values of a tab, if it exists.
    pub async fn values(&self, spreadsheet_id: &str, title: &str) -> Option<Vec<Vec<serde_json::Value>>> {
        let state = self.state.lock().await;
        state
            .spreadsheets
            .get(spreadsheet_id)?
            .iter()
            .find(|t| t.info.title == title)
            .map(|t| t.values.clone())
    }

    /// Grid size (rows, columns) of a tab, if it exists.
    pub async fn grid_size(&self, spreadsheet_id: &str, title: &str) -> Option<(usize, usize)> {
        let state = self.state.lock().await;
        state
            .spreadsheets
            .get(spreadsheet_id)?
            .iter()
            .find(|t| t.info.title == title)
            .map(|t| (t.rows, t.columns))
    }

    /// Tab titles of a spreadsheet in index order.
    pub async fn titles(&self, spreadsheet_id: &str) -> Vec<String> {
        let state = self.state.lock().await;
        let mut tabs: Vec<_> = state
            .spreadsheets
            .get(spreadsheet_id)
            .map(|tabs| tabs.iter().map(|t| t.info.clone()).collect())
            .unwrap_or_default();
        tabs.sort_by_key(|t| t.index);
        tabs.into_iter().map(|t| t.title).collect()
    }

    /// Number of API calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn spreadsheet<'a>(
    state: &'a mut State,
    spreadsheet_id: &str,
) -> Result<&'a mut Vec<MemoryTab>, SheetsApiError> {
    state
        .spreadsheets
        .get_mut(spreadsheet_id)
        .ok_or_else(|| SheetsApiError::NotFound(format!("spreadsheet {} not found", spreadsheet_id)))
}

#[async_trait]
impl SheetsApi for MemorySheets {
    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<TabInfo>, SheetsApiError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let tabs = spreadsheet(&mut state, spreadsheet_id)?;
        Ok(tabs.iter().map(|t| t.info.clone()).collect())
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        tab: &str,
    ) -> Result<Vec<Vec<serde_json::Value>>, SheetsApiError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let tabs = spreadsheet(&mut state, spreadsheet_id)?;
        tabs.iter()
            .find(|t| t.info.title == tab)
            .map(|t| t.values.clone())
            .ok_or_else(|| bad_request(format!("Unable to parse range: '{}'", tab)))
    }

    async fn add_tab(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: usize,
        columns: usize,
    ) -> Result<TabInfo, SheetsApiError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let sheet_id = state.next_sheet_id;
        let tabs = spreadsheet(&mut state, spreadsheet_id)?;

        if tabs.iter().any(|t| t.info.title.to_lowercase() == title.to_lowercase()) {
            return Err(bad_request(format!(
                "A sheet with the name \"{}\" already exists.",
                title
            )));
        }
        if rows == 0 || columns == 0 {
            return Err(bad_request("grid size must be positive"));
        }

        let info = TabInfo {
            sheet_id,
            title: title.to_string(),
            index: tabs.len() as i64,
        };
        tabs.push(MemoryTab {
            info: info.clone(),
            rows,
            columns,
            values: Vec::new(),
        });
        state.next_sheet_id += 1;
        Ok(info)
    }

    async fn delete_tab(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<(), SheetsApiError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let tabs = spreadsheet(&mut state, spreadsheet_id)?;

        let position = tabs
            .iter()
            .position(|t| t.info.sheet_id == sheet_id)
            .ok_or_else(|| bad_request(format!("No grid with id: {}", sheet_id)))?;
        if tabs.len() == 1 {
            return Err(bad_request("You can't remove all the sheets in a document."));
        }

        tabs.remove(position);
        for (index, tab) in tabs.iter_mut().enumerate() {
            tab.info.index = index as i64;
        }
        Ok(())
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        tab: &str,
        values: Vec<Vec<serde_json::Value>>,
    ) -> Result<(), SheetsApiError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let tabs = spreadsheet(&mut state, spreadsheet_id)?;

        let target = tabs
            .iter_mut()
            .find(|t| t.info.title == tab)
            .ok_or_else(|| bad_request(format!("Unable to parse range: '{}'", tab)))?;

        let width = values.iter().map(Vec::len).max().unwrap_or(0);
        if values.len() > target.rows || width > target.columns {
            return Err(bad_request(format!(
                "Range ('{}'!A1) exceeds grid limits. Max rows: {}, max columns: {}",
                tab, target.rows, target.columns
            )));
        }

        target.values = values;
        Ok(())
    }
}
