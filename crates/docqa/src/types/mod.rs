//! Core types: sources, file types and result documents

pub mod document;
pub mod source;

pub use document::{AnswerRecord, ResultDocument, QUESTIONS};
pub use source::{slugify_url, FileType, Source};
