//! Model client for the Ollama HTTP API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ModelError, Result};

use super::model::ModelClient;

/// Ollama API client using `/api/generate` without streaming
pub struct HttpModelClient {
    /// HTTP client
    client: Client,
    /// Ollama base URL
    base_url: String,
    /// Generation model name
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct VersionResponse {
    version: String,
}

impl HttpModelClient {
    /// Create a new client; per-request timeouts are applied on each call
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder().pool_max_idle_per_host(2).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn invoke(&self, prompt: &str, timeout: Duration) -> std::result::Result<String, ModelError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::debug!("Generating answer with model: {}", self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { ModelError::Timeout(timeout) } else { e.into() })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Http(format!("Generation failed: HTTP {}: {}", status, body.trim())));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| if e.is_timeout() { ModelError::Timeout(timeout) } else { e.into() })?;

        Ok(generated.response)
    }

    async fn check_available(&self) -> std::result::Result<String, ModelError> {
        let url = format!("{}/api/version", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .error_for_status()?;

        let version: VersionResponse = response.json().await?;
        Ok(format!("ollama {} ({})", version.version, self.base_url))
    }

    fn name(&self) -> &str {
        "ollama-http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve one canned HTTP response and return the request that was received
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });
        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_generate() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", r#"{"model":"llama3","response":"  An answer.  ","done":true}"#).await;
        let client = HttpModelClient::new(&base_url, "llama3").unwrap();

        let answer = client.invoke("Context:\nx\n\nQuestion: y", Duration::from_secs(5)).await.unwrap();
        assert_eq!(answer, "  An answer.  ");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/generate"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (base_url, _server) = serve_once("HTTP/1.1 404 Not Found", r#"{"error":"model 'nope' not found"}"#).await;
        let client = HttpModelClient::new(&base_url, "nope").unwrap();

        let err = client.invoke("prompt", Duration::from_secs(5)).await.unwrap_err();
        match err {
            ModelError::Http(message) => assert!(message.contains("not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
