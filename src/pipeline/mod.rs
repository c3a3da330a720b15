//! Long-document summarization: chunking and map-reduce orchestration

pub mod splitter;
pub mod summarize;

pub use splitter::RecursiveCharacterSplitter;
pub use summarize::{MapReduceSummarizer, summarize_request};

/// Shown to users when the model could not produce a summary.
pub const CANONICAL_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't generate a summary at this time. Please try again later.";
