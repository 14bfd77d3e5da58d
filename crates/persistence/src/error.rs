//! Persistence error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Blocking task panicked or was cancelled
    #[error("Task error: {0}")]
    TaskError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl PersistenceError {
    /// True for UNIQUE / NOT NULL / CHECK violations
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            PersistenceError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

impl From<tokio::task::JoinError> for PersistenceError {
    fn from(err: tokio::task::JoinError) -> Self {
        PersistenceError::TaskError(err.to_string())
    }
}

impl From<PersistenceError> for cash_track_core::Error {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => cash_track_core::Error::NotFound(what),
            PersistenceError::Conflict(what) => cash_track_core::Error::Conflict(what),
            PersistenceError::InvalidData(what) => cash_track_core::Error::InvalidInput(what),
            other => cash_track_core::Error::Persistence(other.to_string()),
        }
    }
}
