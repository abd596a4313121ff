// ABOUTME: Tool module - defines tools, registry, and execution.
// ABOUTME: The registry is the only surface the dispatcher talks to.

mod registry;
mod result;
mod traits;

pub use registry::*;
pub use result::*;
pub use traits::*;

#[cfg(test)]
mod registry_test;
