// ABOUTME: Dispatcher - runs the think-act loop for one natural-language command.
// ABOUTME: Sends the conversation to the model and executes the tools it asks for.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::LlmError;
use crate::llm::{ContentBlock, LlmClient, Message, Request, Usage};
use crate::tool::Registry;

/// Default cap on model round trips per command.
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

const MAX_TOKENS: u32 = 4096;

/// Instructions given to the model with every command.
pub const SYSTEM_PROMPT: &str = "\
You move and filter tabular data in Excel workbooks and Google Sheets on behalf of the user.

Use the tools:
- read_excel / read_gsheet show the column names and first rows of a sheet. Read a sheet \
before filtering it so you use the exact column names.
- filter_and_write_excel / filter_and_write_gsheet keep the rows matching a condition and \
write them to a new sheet. Writing to an existing sheet name replaces that sheet.

Conditions compare columns with literals: ==, !=, <, <=, >, >=, combined with and, or, not, \
and parentheses. `col in ['a', 'b']` tests membership. Quote text with single or double \
quotes and wrap column names containing spaces in backticks.

Tool results starting with ❌ are failures; explain them to the user instead of retrying \
blindly. Finish with a short summary of what was done.";

/// A tool call made while handling a command.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    pub input: serde_json::Value,
    pub output: String,
    pub is_error: bool,
}

/// Result of dispatching one command.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Unique identifier for this run, used to correlate log lines.
    pub run_id: String,

    /// Final text answer from the model.
    pub content: String,

    /// Every tool call, in execution order.
    pub tool_calls: Vec<ToolCallRecord>,

    /// Total token usage across all model calls.
    pub usage: Usage,

    /// Number of model round trips.
    pub iterations: usize,
}

/// Turns commands into tool calls through a chat model.
pub struct Dispatcher {
    client: Arc<dyn LlmClient>,
    registry: Registry,
    model: String,
    max_iterations: usize,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn LlmClient>, registry: Registry, model: impl Into<String>) -> Self {
        Self {
            client,
            registry,
            model: model.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the cap on model round trips per command.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Handle one command in a fresh conversation.
    pub async fn run(&self, command: &str) -> Result<DispatchOutcome, LlmError> {
        let run_id = Uuid::new_v4().to_string();
        let tools = self.registry.to_definitions().await;
        let mut messages = vec![Message::user(command)];
        let mut tool_calls = Vec::new();
        let mut usage = Usage::default();

        tracing::info!(run_id = %run_id, model = %self.model, "dispatching command");

        for iteration in 1..=self.max_iterations {
            let request = Request {
                model: self.model.clone(),
                system: Some(SYSTEM_PROMPT.to_string()),
                messages: messages.clone(),
                tools: tools.clone(),
                max_tokens: Some(MAX_TOKENS),
                temperature: Some(0.0),
            };

            let response = self.client.create_message(&request).await?;
            usage += response.usage;

            if !response.has_tool_use() {
                tracing::info!(
                    run_id = %run_id,
                    iterations = iteration,
                    tool_calls = tool_calls.len(),
                    tokens = usage.total(),
                    "command finished"
                );
                return Ok(DispatchOutcome {
                    run_id,
                    content: response.text(),
                    tool_calls,
                    usage,
                    iterations: iteration,
                });
            }

            messages.push(response.to_message());

            let mut results = Vec::new();
            for call in response.tool_calls() {
                let result = self.registry.invoke(&call.name, call.input.clone()).await;
                results.push(ContentBlock::tool_result(
                    &call.id,
                    &result.content,
                    result.is_error,
                ));
                tool_calls.push(ToolCallRecord {
                    name: call.name,
                    input: call.input,
                    output: result.content,
                    is_error: result.is_error,
                });
            }
            messages.push(Message::tool_results(results));
        }

        tracing::warn!(run_id = %run_id, max = self.max_iterations, "command hit the iteration cap");
        Err(LlmError::MaxIterations(self.max_iterations))
    }
}
