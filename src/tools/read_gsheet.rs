// ABOUTME: ReadGsheetTool - previews a tab of a Google Sheet.
// ABOUTME: Refuses without touching the network when no client is configured.

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapter::{self, SheetRef};
use crate::gsheet::{NOT_CONFIGURED, RemoteSheets};
use crate::tool::{Tool, ToolResult};

/// Tool for previewing a Google Sheet tab.
pub struct ReadGsheetTool {
    remote: RemoteSheets,
}

impl ReadGsheetTool {
    pub fn new(remote: RemoteSheets) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl Tool for ReadGsheetTool {
    fn name(&self) -> &str {
        "read_gsheet"
    }

    fn description(&self) -> &str {
        "Read a tab of a Google Sheet. Returns its column names and the first 5 rows. \
         Reads the first tab unless a worksheet name is given."
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
                    "description": "Name of the tab to read (defaults to the first tab)"
                }
            },
            "required": ["sheet_id"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            sheet_id: String,
            worksheet: Option<String>,
        }
        let params: Params = serde_json::from_value(params)?;

        if !self.remote.is_configured() {
            return Ok(ToolResult::error(NOT_CONFIGURED));
        }

        let source = SheetRef::remote(&params.sheet_id, params.worksheet.as_deref());
        match adapter::preview(&source, &self.remote).await {
            Ok(preview) => Ok(ToolResult::text(preview)),
            Err(e) => Ok(ToolResult::failure(e)),
        }
    }
}
