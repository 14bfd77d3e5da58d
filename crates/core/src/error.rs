//! Shared error type for the collaborator seams

use thiserror::Error;

/// Errors crossing crate boundaries through the core traits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Text-recognition service unreachable or returned a failure
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// Language-model service unreachable or returned a failure
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint or similar write conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
