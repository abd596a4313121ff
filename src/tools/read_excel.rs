// ABOUTME: ReadExcelTool - previews the first sheet of a local workbook.
// ABOUTME: Returns the column list and first rows, or a failure description.

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapter::{self, SheetRef};
use crate::gsheet::RemoteSheets;
use crate::tool::{Tool, ToolResult};

/// Tool for previewing an Excel workbook.
pub struct ReadExcelTool;

#[async_trait]
impl Tool for ReadExcelTool {
    fn name(&self) -> &str {
        "read_excel"
    }

    fn description(&self) -> &str {
        "Read the first sheet of a local Excel workbook. Returns its column names and the first 5 rows."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the .xlsx workbook"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            file_path: String,
        }
        let params: Params = serde_json::from_value(params)?;

        let source = SheetRef::workbook(&params.file_path, None);
        match adapter::preview(&source, &RemoteSheets::NotConfigured).await {
            Ok(preview) => Ok(ToolResult::text(preview)),
            Err(e) => Ok(ToolResult::failure(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CellValue, Table};
    use crate::workbook;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_excel_preview() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.xlsx");
        let table = Table::new(
            ["name", "age"],
            vec![
                vec!["Alice".into(), CellValue::Int(30)],
                vec!["Bob".into(), CellValue::Int(20)],
            ],
        );
        workbook::write_sheet(&path, "People", &table).unwrap();

        let result = ReadExcelTool
            .execute(serde_json::json!({ "file_path": path.to_str().unwrap() }))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert_eq!(
            result.content,
            "Columns: name, age\n\nPreview:\n    name  age\n0  Alice   30\n1    Bob   20"
        );
    }

    #[tokio::test]
    async fn test_read_excel_missing_file() {
        let result = ReadExcelTool
            .execute(serde_json::json!({ "file_path": "/nonexistent/book.xlsx" }))
            .await
            .unwrap();

        assert!(result.is_error);
        assert!(result.content.starts_with("❌ Source not found:"));
    }

    #[tokio::test]
    async fn test_read_excel_missing_param() {
        let result = ReadExcelTool.execute(serde_json::json!({})).await;
        assert!(result.is_err());
    }
}
