// ABOUTME: Defines the LlmClient trait - the seam between the dispatcher and
// ABOUTME: a chat model, so tests can script the model's replies.

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// Trait for LLM client implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a conversation and return the model's next message.
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}
