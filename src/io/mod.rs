//! Scenario loading and report emission.

mod format;
pub mod input;
pub mod output;

pub use format::DocumentFormat;
pub use input::{parse_document_str, parse_typed_document};
pub use output::{OutputDestination, OutputOptions, emit};
