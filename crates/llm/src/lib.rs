//! Language model integration
//!
//! Features:
//! - Ollama `/api/generate` backend implementing `LanguageModel`
//! - Chat and slip prompt templates
//! - Defensive decoding of model output into an `IntentResult`
//! - Intent interpreter with rule-based fallback

pub mod backend;
pub mod interpreter;
pub mod prompt;
pub mod response;

pub use backend::{LlmConfig, OllamaBackend};
pub use interpreter::{IntentInterpreter, Interpretation, InterpretationPath};
pub use prompt::{chat_prompt, slip_prompt};
pub use response::{extract_json, parse_model_output};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for cash_track_core::Error {
    fn from(err: LlmError) -> Self {
        cash_track_core::Error::Generation(err.to_string())
    }
}
