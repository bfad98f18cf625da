//! Model client abstractions
//!
//! Prompts can reach the model runtime either by spawning its executable or
//! through its local HTTP API; both sit behind [`ModelClient`].

pub mod command;
pub mod http;
pub mod model;

pub use command::CommandModelClient;
pub use http::HttpModelClient;
pub use model::ModelClient;

use std::sync::Arc;

use crate::config::{ModelConfig, Transport};
use crate::error::Result;

/// Build the client selected by the configuration
pub fn from_config(config: &ModelConfig) -> Result<Arc<dyn ModelClient>> {
    let client: Arc<dyn ModelClient> = match config.transport {
        Transport::Cli => Arc::new(CommandModelClient::ollama(&config.program, &config.model)),
        Transport::Http => Arc::new(HttpModelClient::new(&config.base_url, &config.model)?),
    };
    Ok(client)
}
