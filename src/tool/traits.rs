// ABOUTME: Defines the Tool trait - a named operation the dispatcher can invoke.
// ABOUTME: Tools have a name, description, argument schema, and async execute.

use async_trait::async_trait;

use super::ToolResult;

/// A tool that can be executed by the dispatcher.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    ///
    /// Domain failures belong in an error [`ToolResult`]; `Err` is reserved
    /// for arguments that do not match the schema.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error>;
}
