//! Collaborator seams
//!
//! ```text
//! TextRecognizer: slip image -> plain text (OCR sidecar)
//! LanguageModel:  prompt -> raw text with embedded JSON
//! Repository:     users, transactions and aggregates
//! ```

mod llm;
mod recognizer;
mod repository;

pub use llm::LanguageModel;
pub use recognizer::TextRecognizer;
pub use repository::Repository;
