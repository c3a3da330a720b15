//! All AI/LLM functionality

pub mod client;
pub mod prompt_builder;

// Re-export main types for convenience
pub use client::{GeneratorFactory, LlmClient, OpenAiFactory, TextGenerator, estimate_tokens};
pub use prompt_builder::{PromptSet, PromptTemplate};
