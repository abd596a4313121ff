// ABOUTME: Defines all error types for the sheet-agent library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under AgentError.

/// Top-level error type for the sheet-agent library.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while a tool moves data between a source and a sink.
///
/// Tools never return these to the dispatcher; they are rendered into the
/// tool's result text instead.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Errors from loading a sheet or tab.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read source: {0}")]
    Read(String),
}

/// Errors from parsing or binding a filter expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("Filter syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("Filter reference error: unknown column '{0}'")]
    Reference(String),
}

/// Errors from writing a sheet or tab.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write sheet: {0}")]
    Write(String),
}

/// Errors from the Google Sheets transport.
#[derive(Debug, thiserror::Error)]
pub enum SheetsApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Errors from LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Agent exceeded max iterations ({0})")]
    MaxIterations(usize),
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),
}

/// Errors from startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Invalid credentials file {path}: {message}")]
    InvalidCredentials { path: String, message: String },
}
