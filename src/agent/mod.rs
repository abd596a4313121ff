// ABOUTME: Command dispatch - turns a natural-language command into tool calls.
// ABOUTME: Provides the Dispatcher and the records of what it did.

mod dispatcher;

pub use dispatcher::{
    DEFAULT_MAX_ITERATIONS, DispatchOutcome, Dispatcher, SYSTEM_PROMPT, ToolCallRecord,
};

#[cfg(test)]
mod dispatcher_test;
