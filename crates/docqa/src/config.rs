//! Configuration for docqa

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory that receives one JSON document per processed source
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Model runtime configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Web page fetching configuration
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            model: ModelConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                let config: AppConfig = toml::from_str(&contents)?;
                config.validate()?;
                tracing::debug!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Reject settings that would make every request fail immediately
    pub fn validate(&self) -> Result<()> {
        if self.model.timeout_secs == 0 {
            return Err(Error::config("model.timeout_secs must be greater than zero"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(Error::config("fetch.timeout_secs must be greater than zero"));
        }
        if self.model.model.trim().is_empty() {
            return Err(Error::config("model.model must not be empty"));
        }
        Ok(())
    }
}

/// How prompts reach the model runtime
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Spawn `<program> run <model>` per question
    #[default]
    Cli,
    /// POST to the runtime's local HTTP API
    Http,
}

/// Model (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Transport used to reach the model
    #[serde(default)]
    pub transport: Transport,
    /// Model runtime executable
    #[serde(default = "default_program")]
    pub program: String,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-question timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
    /// Base URL of the runtime HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl ModelConfig {
    /// Per-question time limit
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// What to tell the operator when the runtime cannot be reached
    pub fn unavailable_hint(&self) -> String {
        match self.transport {
            Transport::Cli => format!("{} is not installed or not in PATH", self.program),
            Transport::Http => format!("no model runtime is answering at {}", self.base_url),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            program: default_program(),
            model: default_model(),
            timeout_secs: default_model_timeout(),
            base_url: default_base_url(),
        }
    }
}

/// Web page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// User-Agent header sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetchConfig {
    /// Request time limit
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_program() -> String { "ollama".to_string() }
fn default_model() -> String { "llama3".to_string() }
fn default_model_timeout() -> u64 { 300 } // 5 minutes for long answers
fn default_base_url() -> String { "http://localhost:11434".to_string() }
fn default_fetch_timeout() -> u64 { 10 }
fn default_user_agent() -> String { format!("docqa/{}", env!("CARGO_PKG_VERSION")) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.model.program, "ollama");
        assert_eq!(config.model.transport, Transport::Cli);
        assert_eq!(config.model.timeout(), Duration::from_secs(300));
        assert_eq!(config.fetch.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            output_dir = "answers"

            [model]
            model = "mistral"
            transport = "http"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("answers"));
        assert_eq!(config.model.model, "mistral");
        assert_eq!(config.model.transport, Transport::Http);
        assert_eq!(config.model.timeout_secs, 300);
        assert_eq!(config.fetch.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docqa.toml");
        std::fs::write(&path, "[fetch]\ntimeout_secs = 3\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_unavailable_hint_follows_transport() {
        let mut model = ModelConfig::default();
        assert_eq!(model.unavailable_hint(), "ollama is not installed or not in PATH");

        model.transport = Transport::Http;
        model.base_url = "http://gpu-box:11434".to_string();
        let hint = model.unavailable_hint();
        assert!(hint.contains("http://gpu-box:11434"));
        assert!(!hint.contains("PATH"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docqa.toml");
        std::fs::write(&path, "[model]\ntimeout_secs = 0\n").unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
