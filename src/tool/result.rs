// ABOUTME: Defines the ToolResult type - the text a tool hands back to the
// ABOUTME: dispatcher, with an error flag and metadata for hosts.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Prefix of every successful write summary.
pub const SUCCESS_MARKER: &str = "✅";

/// Prefix of every failure description.
pub const FAILURE_MARKER: &str = "❌";

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The output content.
    pub content: String,

    /// Whether this result represents an error.
    pub is_error: bool,

    /// Optional metadata about the execution.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    /// Create a successful text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
            metadata: HashMap::new(),
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
            metadata: HashMap::new(),
        }
    }

    /// Create an error result describing `err` behind the failure marker.
    pub fn failure(err: impl fmt::Display) -> Self {
        Self::error(format!("{} {}", FAILURE_MARKER, err))
    }

    /// Add metadata to the result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }
}

impl Default for ToolResult {
    fn default() -> Self {
        Self::text("")
    }
}
