//! Text extraction from documents and web pages

mod parser;
mod web;

pub use parser::{FileParser, ParsedDocument};
pub use web::{html_to_text, WebExtractor};
