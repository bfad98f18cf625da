//! Question answering against a model client

use std::sync::Arc;
use std::time::Duration;

use crate::error::ModelError;
use crate::providers::ModelClient;

use super::prompt::PromptBuilder;

/// Prefix marking an answer that records a failure instead of model output
pub const ERROR_PREFIX: &str = "Error: ";

/// Answer stored when the model does not finish in time
pub const TIMEOUT_ANSWER: &str = "Error: Request timed out";

/// Asks questions about a context text, one model invocation per question
pub struct QueryEngine {
    client: Arc<dyn ModelClient>,
    timeout: Duration,
}

impl QueryEngine {
    pub fn new(client: Arc<dyn ModelClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Answer a question about `context`.
    ///
    /// Never fails: timeouts and runtime errors become an answer starting with
    /// [`ERROR_PREFIX`] so the rest of the source can still be answered.
    pub async fn ask(&self, question: &str, context: &str) -> String {
        let prompt = PromptBuilder::build_qa_prompt(question, context);

        match self.client.invoke(&prompt, self.timeout).await {
            Ok(output) => output.trim().to_string(),
            Err(ModelError::Timeout(limit)) => {
                tracing::warn!("{} request timed out after {:?} for question: {}", self.client.name(), limit, question);
                TIMEOUT_ANSWER.to_string()
            }
            Err(ModelError::ExitStatus { status, stderr }) => {
                tracing::warn!("{} error ({}): {}", self.client.name(), status, stderr);
                format!("{}{}", ERROR_PREFIX, stderr)
            }
            Err(e) => {
                tracing::warn!("Error calling {}: {}", self.client.name(), e);
                format!("{}{}", ERROR_PREFIX, e)
            }
        }
    }
}
