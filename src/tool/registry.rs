// ABOUTME: Implements the Registry - a thread-safe container the dispatcher
// ABOUTME: uses to discover and invoke the available tools by name.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Tool, ToolResult};
use crate::error::ToolError;
use crate::llm::ToolDefinition;

/// A thread-safe registry of tools. Clones share the same tools.
#[derive(Clone, Default)]
pub struct Registry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        let mut tools = self.tools.write().await;
        tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// List all tool names, sorted alphabetically.
    pub async fn list(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<_> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Convert all tools to LLM tool definitions, sorted by name.
    pub async fn to_definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        let mut definitions: Vec<_> = tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.schema(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Run a tool by name and always return its result text.
    ///
    /// Unknown tools and arguments that do not match the schema come back
    /// as error results instead of faults.
    pub async fn invoke(&self, name: &str, params: serde_json::Value) -> ToolResult {
        let Some(tool) = self.get(name).await else {
            return ToolResult::failure(ToolError::NotFound(name.to_string()));
        };

        tracing::info!(tool = name, %params, "invoking tool");
        match tool.execute(params).await {
            Ok(result) => {
                if result.is_error {
                    tracing::warn!(tool = name, content = %result.content, "tool reported failure");
                }
                result
            }
            Err(e) => {
                let error = match e.downcast::<serde_json::Error>() {
                    Ok(e) => ToolError::InvalidParams(e.to_string()),
                    Err(e) => ToolError::Execution(e),
                };
                tracing::warn!(tool = name, %error, "tool execution failed");
                ToolResult::failure(error)
            }
        }
    }
}
