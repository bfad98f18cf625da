//! Prompt construction and question answering

mod prompt;
mod query;

pub use prompt::PromptBuilder;
pub use query::{QueryEngine, ERROR_PREFIX, TIMEOUT_ANSWER};
