// ABOUTME: Root module for sheet-agent - spreadsheet tools for an LLM dispatcher.
// ABOUTME: Re-exports the public modules; see `prelude` for common imports.

pub mod adapter;
pub mod agent;
pub mod config;
pub mod error;
pub mod filter;
pub mod gsheet;
pub mod llm;
pub mod prelude;
pub mod table;
pub mod tool;
pub mod tools;
pub mod workbook;

pub use error::AgentError;
