//! HTTP OCR client - calls the external recognition service
//!
//! `POST {url}/ocr` with a multipart `file` part, answered by
//! `{"text": "...", "error": "..."}`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use cash_track_config::OcrSettings;
use cash_track_core::TextRecognizer;

use crate::OcrError;

/// HTTP OCR client configuration
#[derive(Debug, Clone)]
pub struct HttpOcrConfig {
    /// Base URL of the OCR service
    pub url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpOcrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8001".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl From<&OcrSettings> for HttpOcrConfig {
    fn from(settings: &OcrSettings) -> Self {
        Self {
            url: settings.endpoint.clone(),
            timeout_ms: settings.timeout_seconds * 1000,
        }
    }
}

/// Response from the OCR service
#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    error: Option<String>,
}

pub struct HttpOcrClient {
    config: HttpOcrConfig,
    client: reqwest::Client,
}

impl HttpOcrClient {
    pub fn new(config: HttpOcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| OcrError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Send an image and return the recognized text (possibly empty)
    pub async fn recognize(&self, image: &[u8], file_name: &str) -> Result<String, OcrError> {
        let part = Part::bytes(image.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type_for(file_name))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/ocr"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Status { status, body });
        }

        let result: OcrResponse = response
            .json()
            .await
            .map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

        if let Some(error) = result.error.filter(|e| !e.trim().is_empty()) {
            return Err(OcrError::Recognition(error));
        }

        tracing::debug!(
            file_name,
            bytes = image.len(),
            text_chars = result.text.chars().count(),
            "OCR finished"
        );

        Ok(result.text)
    }

    /// Readiness probe
    pub async fn health(&self) -> bool {
        self.client
            .get(self.url("/health"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl TextRecognizer for HttpOcrClient {
    async fn extract_text(&self, image: &[u8], file_name: &str) -> cash_track_core::Result<String> {
        Ok(self.recognize(image, file_name).await?)
    }
}

/// Image content type from a file name's extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
