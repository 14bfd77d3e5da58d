//! Ollama backend
//!
//! Single-shot, non-streaming completions over `POST /api/generate`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use cash_track_config::LlmSettings;
use cash_track_core::LanguageModel;

use crate::LlmError;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Ollama base URL
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Sampling temperature; model default when unset
    pub temperature: Option<f32>,
    /// Keep the model loaded between calls ("5m", "-1", ...)
    pub keep_alive: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            timeout: Duration::from_secs(60),
            temperature: None,
            keep_alive: None,
        }
    }
}

impl From<&LlmSettings> for LlmConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
            temperature: settings.temperature,
            keep_alive: settings.keep_alive.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

/// Ollama HTTP client
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Build the API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// Generate a completion. No retries: callers fall back on failure.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: self
                .config
                .temperature
                .map(|temperature| GenerateOptions { temperature }),
            keep_alive: self.config.keep_alive.as_deref(),
        };

        let start = std::time::Instant::now();
        let result = self.execute_request(&request).await?;
        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            done = result.done,
            response_chars = result.response.chars().count(),
            "Ollama generation finished"
        );

        Ok(result.response)
    }

    async fn execute_request(
        &self,
        request: &GenerateRequest<'_>,
    ) -> Result<GenerateResponse, LlmError> {
        let response = self
            .client
            .post(self.api_url("/generate"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
            }
            return Err(LlmError::Api(format!("{}: {}", status, error)));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Readiness probe
    pub async fn is_available(&self) -> bool {
        self.client
            .get(self.api_url("/tags"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl LanguageModel for OllamaBackend {
    async fn generate(&self, prompt: &str) -> cash_track_core::Result<String> {
        Ok(self.complete(prompt).await?)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
