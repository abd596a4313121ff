// ABOUTME: Workbook module - local spreadsheet files as sources and sinks.
// ABOUTME: Reads through calamine, rewrites .xlsx files through rust_xlsxwriter.

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;
