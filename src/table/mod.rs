// ABOUTME: Table module - the uniform in-memory shape every sheet is loaded into.
// ABOUTME: Typed cell values, header normalisation, and text previews.

mod grid;
mod preview;
mod value;

pub use grid::*;
pub use preview::*;
pub use value::*;
