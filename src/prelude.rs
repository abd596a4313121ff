// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use sheet_agent::prelude::*;` to get started quickly.

pub use crate::adapter::{SheetRef, WriteSummary};
pub use crate::agent::{DispatchOutcome, Dispatcher, ToolCallRecord};
pub use crate::config::Config;
pub use crate::error::{
    AgentError, ConfigError, FilterError, LlmError, SheetError, SheetsApiError, SinkError,
    SourceError, ToolError,
};
pub use crate::filter::{Expr, filter, parse};
pub use crate::gsheet::{
    GoogleSheetsClient, MemorySheets, NOT_CONFIGURED, RemoteSheets, ServiceAccount, SheetsApi,
    TabInfo,
};
pub use crate::llm::{
    ContentBlock, LlmClient, Message, OpenAIClient, Request, Response, Role, StopReason,
    ToolCall, ToolDefinition, Usage,
};
pub use crate::table::{CellValue, PREVIEW_ROWS, Table};
pub use crate::tool::{Registry, Tool, ToolResult};
pub use crate::tools::{
    FilterAndWriteExcelTool, FilterAndWriteGsheetTool, ReadExcelTool, ReadGsheetTool,
    register_spreadsheet_tools, spreadsheet_registry,
};
