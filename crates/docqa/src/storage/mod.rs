//! Result persistence

mod writer;

pub use writer::ResultWriter;
