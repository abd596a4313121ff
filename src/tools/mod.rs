// ABOUTME: The four spreadsheet tools exposed to the dispatcher.
// ABOUTME: Read or filter-and-write an Excel workbook or a Google Sheet.

mod filter_and_write_excel;
mod filter_and_write_gsheet;
mod read_excel;
mod read_gsheet;

pub use filter_and_write_excel::FilterAndWriteExcelTool;
pub use filter_and_write_gsheet::FilterAndWriteGsheetTool;
pub use read_excel::ReadExcelTool;
pub use read_gsheet::ReadGsheetTool;

use crate::adapter::WriteSummary;
use crate::gsheet::RemoteSheets;
use crate::tool::{Registry, ToolResult};

/// Register all four spreadsheet tools, sharing one remote handle.
pub async fn register_spreadsheet_tools(registry: &Registry, remote: RemoteSheets) {
    registry.register(ReadExcelTool).await;
    registry.register(FilterAndWriteExcelTool).await;
    registry
        .register(ReadGsheetTool::new(remote.clone()))
        .await;
    registry.register(FilterAndWriteGsheetTool::new(remote)).await;
}

/// A registry holding exactly the spreadsheet tools.
pub async fn spreadsheet_registry(remote: RemoteSheets) -> Registry {
    let registry = Registry::new();
    register_spreadsheet_tools(&registry, remote).await;
    registry
}

fn written(summary: &WriteSummary, message: String) -> ToolResult {
    ToolResult::text(message)
        .with_metadata("rows_written", summary.rows_written)
        .with_metadata("sheet_name", &summary.sheet_name)
}
