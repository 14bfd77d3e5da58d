//! Chat endpoint
//!
//! POST /api/chat

use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use cash_track_agent::{ChatOutcome, ChatRequest};
use cash_track_core::Language;

use crate::state::AppState;
use crate::user_context::CurrentUser;
use crate::{parse_json, ServerError};

#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    image_path: Option<String>,
    #[serde(default)]
    lang: Option<String>,
}

pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Json<ChatOutcome>, ServerError> {
    let body: ChatBody = parse_json(&body)?;

    let image_reference = body
        .image_path
        .map(|reference| reference.trim().to_string())
        .filter(|reference| !reference.is_empty());

    let image = match &image_reference {
        Some(reference) => {
            // reject traversal before touching the disk
            state.storage.path_of(reference)?;
            match state.storage.read(reference).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(
                        image = %reference,
                        error = %e,
                        "Failed to read referenced image"
                    );
                    None
                }
            }
        }
        None => None,
    };

    let request = ChatRequest {
        user_id: user.id(),
        cutoff_day: user.cutoff_day(),
        message: body.message,
        image_reference,
        image,
        language: Language::from_tag(body.lang.as_deref().unwrap_or_default()),
    };

    let outcome = state.chat.handle(request).await?;
    Ok(Json(outcome))
}
