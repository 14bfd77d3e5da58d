//! Text recognition for payment slips
//!
//! The recognizer itself runs as a separate HTTP service (EasyOCR, Thai and
//! English models); this crate is the client side.

pub mod client;

pub use client::{content_type_for, HttpOcrClient, HttpOcrConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("OCR service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Service answered but reported a recognition failure
    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        OcrError::Request(err.to_string())
    }
}

impl From<OcrError> for cash_track_core::Error {
    fn from(err: OcrError) -> Self {
        cash_track_core::Error::Recognition(err.to_string())
    }
}
