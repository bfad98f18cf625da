//! docqa: ask a local language model fixed questions about documents and web pages
//!
//! Text is extracted from PDF, PPTX and DOCX files or from a web page, each
//! question of [`QUESTIONS`] is answered by a local Ollama model, and the
//! answers are written as one JSON document per source.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, ModelError, Result};
pub use processing::{ProcessOutcome, Processor, RunSummary};
pub use types::{AnswerRecord, FileType, ResultDocument, Source, QUESTIONS};
