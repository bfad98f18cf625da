//! Model client trait for answering prompts

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ModelError;

/// Blocking-style access to a local language model
///
/// Implementations:
/// - `CommandModelClient`: spawns the runtime executable per prompt
/// - `HttpModelClient`: the runtime's local HTTP API
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a prompt and return the model's raw output, bounded by `timeout`
    async fn invoke(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError>;

    /// Verify the runtime is reachable, returning a short description of it
    async fn check_available(&self) -> Result<String, ModelError>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
