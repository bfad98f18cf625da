//! Model client that runs the model runtime as a child process

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::ModelError;

use super::model::ModelClient;

/// Availability checks get a short, fixed limit
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Spawns `<program> <run_args...>` per prompt, writing the prompt to stdin
/// and reading the answer from stdout once the process exits.
pub struct CommandModelClient {
    program: String,
    run_args: Vec<String>,
    version_args: Vec<String>,
}

impl CommandModelClient {
    /// Create a client for an arbitrary program
    pub fn new(program: impl Into<String>, run_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            run_args,
            version_args: vec!["--version".to_string()],
        }
    }

    /// Client for `ollama run <model>`
    pub fn ollama(program: &str, model: &str) -> Self {
        Self::new(program, vec!["run".to_string(), model.to_string()])
    }

    /// Override the arguments used for the availability check
    pub fn with_version_args(mut self, args: Vec<String>) -> Self {
        self.version_args = args;
        self
    }

    fn spawn_error(&self, err: std::io::Error) -> ModelError {
        ModelError::Spawn {
            program: self.program.clone(),
            message: err.to_string(),
        }
    }

    async fn run(&self, args: &[String], input: Option<&str>) -> Result<std::process::Output, ModelError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Feed stdin concurrently so a chatty child cannot fill its stdout pipe and stall
        let writer = match (child.stdin.take(), input) {
            (Some(mut stdin), Some(input)) => {
                let bytes = input.as_bytes().to_vec();
                Some(tokio::spawn(async move {
                    let result = stdin.write_all(&bytes).await;
                    drop(stdin);
                    result
                }))
            }
            _ => None,
        };

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit without reading all input; its exit status tells the story
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(ModelError::Io(e)),
                Err(e) => return Err(ModelError::Io(std::io::Error::other(e.to_string()))),
            }
        }

        Ok(output)
    }
}

#[async_trait]
impl ModelClient for CommandModelClient {
    async fn invoke(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError> {
        tracing::debug!("Running {} {:?} ({} byte prompt)", self.program, self.run_args, prompt.len());

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(timeout, self.run(&self.run_args, Some(prompt)))
            .await
            .map_err(|_| ModelError::Timeout(timeout))??;

        if !output.status.success() {
            return Err(ModelError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn check_available(&self) -> Result<String, ModelError> {
        let output = tokio::time::timeout(VERSION_CHECK_TIMEOUT, self.run(&self.version_args, None))
            .await
            .map_err(|_| ModelError::Timeout(VERSION_CHECK_TIMEOUT))??;

        if !output.status.success() {
            return Err(ModelError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandModelClient {
        CommandModelClient::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_prompt_goes_to_stdin() {
        let client = CommandModelClient::new("cat", vec![]);
        let out = client.invoke("Context:\nhello\n\nQuestion: hi?", Duration::from_secs(10)).await.unwrap();
        assert_eq!(out, "Context:\nhello\n\nQuestion: hi?");
    }

    #[tokio::test]
    async fn test_large_prompt_does_not_deadlock() {
        let client = CommandModelClient::new("cat", vec![]);
        let prompt = "x".repeat(1024 * 1024);
        let out = client.invoke(&prompt, Duration::from_secs(30)).await.unwrap();
        assert_eq!(out.len(), prompt.len());
    }

    #[tokio::test]
    async fn test_non_zero_exit_reports_stderr() {
        let client = sh("echo 'model not found' >&2; exit 3");
        let err = client.invoke("prompt", Duration::from_secs(10)).await.unwrap_err();
        match err {
            ModelError::ExitStatus { stderr, .. } => assert_eq!(stderr, "model not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let client = sh("sleep 5");
        let err = client.invoke("prompt", Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let client = CommandModelClient::ollama("docqa-no-such-binary", "llama3");
        let err = client.check_available().await.unwrap_err();
        assert!(matches!(err, ModelError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_version_check() {
        let client = sh("true").with_version_args(vec!["-c".to_string(), "echo 'runtime 1.2.3'".to_string()]);
        assert_eq!(client.check_available().await.unwrap(), "runtime 1.2.3");
    }
}
