// ABOUTME: FilterAndWriteGsheetTool - filters a Google Sheet tab into a new tab.
// ABOUTME: The new tab is sized to the result and replaces any same-named tab.

use async_trait::async_trait;
use serde::Deserialize;

use super::written;
use crate::adapter::{self, SheetRef};
use crate::gsheet::{NOT_CONFIGURED, RemoteSheets};
use crate::tool::{SUCCESS_MARKER, Tool, ToolResult};

/// Tool for filtering a Google Sheet tab into a new tab.
pub struct FilterAndWriteGsheetTool {
    remote: RemoteSheets,
}

impl FilterAndWriteGsheetTool {
    pub fn new(remote: RemoteSheets) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl Tool for FilterAndWriteGsheetTool {
    fn name(&self) -> &str {
        "filter_and_write_gsheet"
    }

    fn description(&self) -> &str {
        "Filter the rows of a Google Sheet tab with a condition (e.g. `age > 25`) and \
         write the matching rows to a new tab of the same spreadsheet. An existing tab \
         with that name is replaced."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "sheet_id": {
                    "type": "string",
                    "description": "The spreadsheet ID from the Google Sheets URL"
                },
                "worksheet": {
                    "type": "string",
                    "description": "Name of the tab to filter (defaults to the first tab)"
                },
                "condition": {
                    "type": "string",
                    "description": "Boolean filter over column names using ==, !=, <, <=, >, >=, and, or, not, in [...]. Quote text with '...' and column names with spaces with backticks."
                },
                "new_sheet": {
                    "type": "string",
                    "description": "Name of the tab to write the matching rows to"
                }
            },
            "required": ["sheet_id", "condition", "new_sheet"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            sheet_id: String,
            worksheet: Option<String>,
            condition: String,
            new_sheet: String,
        }
        let params: Params = serde_json::from_value(params)?;

        if !self.remote.is_configured() {
            return Ok(ToolResult::error(NOT_CONFIGURED));
        }

        let source = SheetRef::remote(&params.sheet_id, params.worksheet.as_deref());
        let outcome =
            adapter::filter_and_write(&source, &params.condition, &params.new_sheet, &self.remote)
                .await;

        match outcome {
            Ok(summary) => {
                let message = format!(
                    "{} Wrote {} rows to Google Sheet tab '{}'.",
                    SUCCESS_MARKER, summary.rows_written, summary.sheet_name
                );
                Ok(written(&summary, message))
            }
            Err(e) => Ok(ToolResult::failure(e)),
        }
    }
}
