// ABOUTME: LLM module - the chat-completion seam the dispatcher talks through.
// ABOUTME: Defines conversation types, the client trait, and the OpenAI client.

mod client;
mod openai;
mod types;

pub use client::*;
pub use openai::*;
pub use types::*;

#[cfg(test)]
mod types_test;
