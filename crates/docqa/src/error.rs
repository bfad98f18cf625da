//! Error types for docqa

use thiserror::Error;

/// Result type alias for docqa operations
pub type Result<T> = std::result::Result<T, Error>;

/// docqa errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Operator input that cannot be processed (bad folder, nothing to do)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model runtime error
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML decoding error
    #[error("TOML error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Failure of a single model invocation
#[derive(Debug, Error)]
pub enum ModelError {
    /// The invocation ran past its time limit
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The model process exited unsuccessfully
    #[error("process exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    /// The model program could not be started
    #[error("failed to start '{program}': {message}")]
    Spawn { program: String, message: String },

    /// Pipe IO with the model process failed
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failure
    #[error("{0}")]
    Http(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Http(err.to_string())
    }
}
