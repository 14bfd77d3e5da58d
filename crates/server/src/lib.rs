//! Cash Track Server
//!
//! JSON API over the chat and slip flows, user selection, dashboard
//! aggregates, upload storage, health and Prometheus metrics.

pub mod chat;
pub mod dashboard;
pub mod http;
pub mod metrics;
pub mod state;
pub mod storage;
pub mod transactions;
pub mod user_context;
pub mod users;

#[cfg(test)]
mod test_support;

pub use http::create_router;
pub use crate::metrics::init_metrics;
pub use state::{AppState, ReadinessProbe};
pub use storage::{StorageError, UploadStorage};
pub use user_context::{CurrentUser, USER_COOKIE};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use cash_track_agent::AgentError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Client-facing message
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to return to the client
    fn public_message(&self) -> String {
        match self {
            ServerError::InvalidRequest(message) => message.clone(),
            ServerError::NotFound(what) => format!("{} not found", what),
            ServerError::Conflict(message) => message.clone(),
            ServerError::PayloadTooLarge => "File too large".to_string(),
            ServerError::Storage(_) => "Failed to store file".to_string(),
            ServerError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.public_message() }))).into_response()
    }
}

impl From<cash_track_core::Error> for ServerError {
    fn from(err: cash_track_core::Error) -> Self {
        use cash_track_core::Error;
        match err {
            Error::NotFound(what) => ServerError::NotFound(what),
            Error::Conflict(message) => ServerError::Conflict(message),
            Error::InvalidInput(message) => ServerError::InvalidRequest(message),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::EmptyRequest => {
                ServerError::InvalidRequest("Message or image is required".to_string())
            }
            AgentError::Core(e) => e.into(),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidReference(_) => {
                ServerError::InvalidRequest("Invalid image reference".to_string())
            }
            other => ServerError::Storage(other.to_string()),
        }
    }
}

/// Decode a JSON body; empty or malformed input is a 400
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServerError::InvalidRequest("Request body is required".to_string()));
    }
    serde_json::from_slice(body)
        .map_err(|_| ServerError::InvalidRequest("Invalid request body".to_string()))
}
