// ABOUTME: FilterAndWriteExcelTool - filters a workbook's first sheet into a new sheet.
// ABOUTME: The result sheet replaces any sheet of the same name in the same file.

use async_trait::async_trait;
use serde::Deserialize;

use super::written;
use crate::adapter::{self, SheetRef};
use crate::gsheet::RemoteSheets;
use crate::tool::{SUCCESS_MARKER, Tool, ToolResult};

/// Tool for filtering an Excel workbook into a new sheet.
pub struct FilterAndWriteExcelTool;

#[async_trait]
impl Tool for FilterAndWriteExcelTool {
    fn name(&self) -> &str {
        "filter_and_write_excel"
    }

    fn description(&self) -> &str {
        "Filter the rows of the first sheet of a local Excel workbook with a condition \
         (e.g. `age > 25 and city == \"Oslo\"`) and write the matching rows to a sheet \
         in the same workbook. An existing sheet with that name is replaced."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the .xlsx workbook"
                },
                "condition": {
                    "type": "string",
                    "description": "Boolean filter over column names using ==, !=, <, <=, >, >=, and, or, not, in [...]. Quote text with '...' and column names with spaces with backticks."
                },
                "new_sheet": {
                    "type": "string",
                    "description": "Name of the sheet to write the matching rows to"
                }
            },
            "required": ["file_path", "condition", "new_sheet"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            file_path: String,
            condition: String,
            new_sheet: String,
        }
        let params: Params = serde_json::from_value(params)?;

        let source = SheetRef::workbook(&params.file_path, None);
        let outcome = adapter::filter_and_write(
            &source,
            &params.condition,
            &params.new_sheet,
            &RemoteSheets::NotConfigured,
        )
        .await;

        match outcome {
            Ok(summary) => {
                let message = format!(
                    "{} Wrote {} rows to sheet '{}' in {}.",
                    SUCCESS_MARKER, summary.rows_written, summary.sheet_name, params.file_path
                );
                Ok(written(&summary, message))
            }
            Err(e) => Ok(ToolResult::failure(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::table::{CellValue, Table};
    use crate::workbook;
    use tempfile::TempDir;

    fn people_workbook(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("people.xlsx");
        let table = Table::new(
            ["name", "age"],
            vec![
                vec!["Alice".into(), CellValue::Int(30)],
                vec!["Bob".into(), CellValue::Int(20)],
                vec!["Cleo".into(), CellValue::Int(41)],
            ],
        );
        workbook::write_sheet(&path, "People", &table).unwrap();
        path
    }

    async fn run(path: &Path, condition: &str, new_sheet: &str) -> ToolResult {
        FilterAndWriteExcelTool
            .execute(serde_json::json!({
                "file_path": path.to_str().unwrap(),
                "condition": condition,
                "new_sheet": new_sheet,
            }))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_filter_and_write() {
        let dir = TempDir::new().unwrap();
        let path = people_workbook(&dir);

        let result = run(&path, "age > 25", "Adults").await;
        assert!(!result.is_error, "{}", result.content);
        assert_eq!(
            result.content,
            format!("✅ Wrote 2 rows to sheet 'Adults' in {}.", path.display())
        );
        assert_eq!(result.metadata["rows_written"], 2);

        let written = workbook::load_sheet(&path, Some("Adults")).unwrap();
        assert_eq!(written.columns(), ["name", "age"]);
        assert_eq!(
            written.rows(),
            [
                vec![CellValue::text("Alice"), CellValue::Int(30)],
                vec![CellValue::text("Cleo"), CellValue::Int(41)],
            ]
        );
    }

    #[tokio::test]
    async fn test_repeat_call_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = people_workbook(&dir);

        run(&path, "age > 25", "Adults").await;
        let first = workbook::load_sheet(&path, Some("Adults")).unwrap();
        run(&path, "age > 25", "Adults").await;
        let second = workbook::load_sheet(&path, Some("Adults")).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.row_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_column_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = people_workbook(&dir);

        let result = run(&path, "salary > 10", "Rich").await;
        assert!(result.is_error);
        assert_eq!(
            result.content,
            "❌ Filter reference error: unknown column 'salary'"
        );
        assert!(workbook::load_sheet(&path, Some("Rich")).is_err());
    }

    #[tokio::test]
    async fn test_syntax_error() {
        let dir = TempDir::new().unwrap();
        let path = people_workbook(&dir);

        let result = run(&path, "age >", "Broken").await;
        assert!(result.is_error);
        assert!(result.content.starts_with("❌ Filter syntax error"));
    }
}
