//! Transaction endpoints
//!
//! - POST   /api/transactions/slip
//! - GET    /api/transactions/recent
//! - GET    /api/transactions/:id
//! - PATCH  /api/transactions/:id/confirm
//! - DELETE /api/transactions/:id

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use cash_track_agent::SlipJob;
use cash_track_core::{
    round_amount, Category, Channel, Confirmation, Direction, NewTransaction, Transaction,
};

use crate::state::AppState;
use crate::user_context::CurrentUser;
use crate::{parse_json, ServerError};

const SLIP_FIELD: &str = "slip";
const RECENT_LIMIT: u32 = 20;
const HISTORY_REDIRECT: &str = "/history";

/// Load a row that belongs to the current user
async fn owned(state: &AppState, user: &CurrentUser, id: i64) -> Result<Transaction, ServerError> {
    match state.repository.get_transaction(id).await? {
        Some(tx) if tx.user_id == user.id() => Ok(tx),
        _ => Err(ServerError::NotFound("Transaction".to_string())),
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge
    } else {
        ServerError::InvalidRequest("Invalid multipart upload".to_string())
    }
}

pub async fn upload_slip(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ServerError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(SLIP_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("No file uploaded".to_string()))?;

    let reference = state.storage.save(&file_name, &bytes).await?;

    let created = match state
        .repository
        .create_transaction(user.id(), NewTransaction::pending_slip(reference.clone()))
        .await
    {
        Ok(created) => created,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&reference).await {
                tracing::warn!(
                    image = %reference,
                    error = %cleanup,
                    "Failed to remove orphaned upload"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        user_id = user.id(),
        transaction_id = created.id,
        image = %reference,
        bytes = bytes.len(),
        "Slip uploaded"
    );

    state.slips.spawn(SlipJob {
        transaction_id: created.id,
        image: bytes.to_vec(),
        file_name: reference.clone(),
    });

    Ok(Json(serde_json::json!({
        "id": created.id,
        "image_path": reference,
        "redirect": format!("/transactions/{}/confirm", created.id),
    })))
}

pub async fn recent(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let transactions = state.repository.list_transactions(user.id(), RECENT_LIMIT, 0).await?;
    Ok(Json(transactions))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, ServerError> {
    Ok(Json(owned(&state, &user, id).await?))
}

/// Confirmation form fields
#[derive(Debug, Deserialize)]
struct ConfirmBody {
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    txn_date: String,
    #[serde(default)]
    direction: String,
    #[serde(default)]
    channel: String,
    #[serde(default)]
    account_label: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
}

impl ConfirmBody {
    fn into_confirmation(self) -> Result<Confirmation, ServerError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ServerError::InvalidRequest("Amount must be greater than zero".to_string()));
        }

        let txn_date = match self.txn_date.trim() {
            "" => None,
            value => {
                let day = value.get(..10).unwrap_or(value);
                let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map_err(|_| ServerError::InvalidRequest("Invalid txn_date".to_string()))?;
                Some(date)
            }
        };

        Ok(Confirmation {
            amount: round_amount(self.amount),
            txn_date,
            direction: Direction::parse(&self.direction).unwrap_or_default(),
            channel: Channel::from_token(&self.channel),
            account_label: non_empty(self.account_label),
            category: Category::from_token(&self.category),
            description: non_empty(self.description),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn confirm(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ServerError> {
    let confirmation = parse_json::<ConfirmBody>(&body)?.into_confirmation()?;
    owned(&state, &user, id).await?;

    if !state.repository.confirm_transaction(id, confirmation).await? {
        return Err(ServerError::NotFound("Transaction".to_string()));
    }
    tracing::info!(user_id = user.id(), transaction_id = id, "Transaction confirmed");

    Ok(Json(serde_json::json!({ "success": true, "redirect": HISTORY_REDIRECT })))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let tx = owned(&state, &user, id).await?;

    if !state.repository.delete_transaction(id).await? {
        return Err(ServerError::NotFound("Transaction".to_string()));
    }

    if let Some(reference) = tx.slip_image_path.as_deref().filter(|r| !r.is_empty()) {
        if let Err(e) = state.storage.delete(reference).await {
            tracing::warn!(
                transaction_id = id,
                image = %reference,
                error = %e,
                "Failed to delete slip"
            );
        }
    }
    tracing::info!(user_id = user.id(), transaction_id = id, "Transaction deleted");

    Ok(Json(serde_json::json!({ "success": true, "redirect": HISTORY_REDIRECT })))
}
