//! Per-source processing: extract, ask, persist

mod input;
mod processor;

pub use input::{resolve_input, scan_directory};
pub use processor::{ProcessOutcome, Processor, RunSummary};
