//! Configuration management for cash-track
//!
//! Supports loading configuration from:
//! - `config/default.*` and `config/{env}.*` files (YAML, TOML, JSON)
//! - Environment variables (`CASH_TRACK_` prefix, `__` section separator)
//! - The flat legacy variables (`SERVER_PORT`, `DATABASE_URL`, `UPLOAD_DIR`,
//!   `OCR_ENDPOINT`, `OLLAMA_URL`, `OLLAMA_MODEL`)

pub mod settings;

pub use settings::{
    load_settings, load_settings_from, DatabaseConfig, LlmSettings, LocaleConfig,
    ObservabilityConfig, OcrSettings, RuntimeEnvironment, ServerConfig, Settings, StorageConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
