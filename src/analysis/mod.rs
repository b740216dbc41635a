//! The analysis pipeline: sanitize, admit, call the model, parse, detect,
//! merge.

mod merge;
mod orchestrator;
mod parse;
mod sanitize;

pub use merge::merge_issues;
pub use orchestrator::Orchestrator;
pub use parse::parse_model_output;
pub use sanitize::{sanitize, MAX_LINE_CHARS};
