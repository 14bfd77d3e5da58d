//! Chat and slip flows
//!
//! Features:
//! - Transaction completion policy (defaults, amount retry, pending/confirmed)
//! - Localized Thai/English replies
//! - Chat service: optional OCR, interpretation, persistence, reply
//! - Detached slip processing with contained failures

pub mod chat;
pub mod completion;
pub mod reply;
pub mod slip;

#[cfg(test)]
mod test_support;

pub use chat::{ChatOutcome, ChatRequest, ChatService};
pub use completion::{complete, Completion, MissingField};
pub use reply::{summary_reply, transaction_reply, Notice};
pub use slip::{SlipJob, SlipOutcome, SlipProcessor};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Neither message text nor an image reference
    #[error("Empty request")]
    EmptyRequest,

    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error(transparent)]
    Core(#[from] cash_track_core::Error),
}

/// First `max_chars` characters, for log fields
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("กินข้าว 50 บาท", 7), "กินข้าว...");
        assert_eq!(truncate("short", 80), "short");
    }
}
