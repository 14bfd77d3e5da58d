//! User endpoints
//!
//! - GET    /api/users
//! - POST   /api/users
//! - POST   /api/users/select
//! - PATCH  /api/users/:id
//! - DELETE /api/users/:id

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::{Extension, Json};
use serde::Deserialize;

use cash_track_core::user::is_valid_cutoff_day;
use cash_track_core::User;

use crate::state::AppState;
use crate::user_context::{user_cookie, CurrentUser};
use crate::{parse_json, ServerError};

#[derive(Debug, Deserialize)]
struct CreateUserBody {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SelectUserBody {
    #[serde(default)]
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct UpdateCutoffBody {
    cutoff_day: i64,
}

async fn existing(state: &AppState, id: i64) -> Result<User, ServerError> {
    state
        .repository
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User".to_string()))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let users = state.repository.list_users().await?;
    Ok(Json(serde_json::json!({
        "current_user_id": current.id(),
        "users": users,
    })))
}

/// Creates the user and selects it
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let body: CreateUserBody = parse_json(&body)?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ServerError::InvalidRequest("Name is required".to_string()));
    }

    let user = state.repository.create_user(name).await.map_err(|e| match e {
        cash_track_core::Error::Conflict(_) => {
            ServerError::Conflict("User name already exists".to_string())
        }
        other => other.into(),
    })?;
    tracing::info!(user_id = user.id, name = %user.name, "User created");

    Ok(([(SET_COOKIE, user_cookie(user.id))], Json(user)))
}

pub async fn select_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let body: SelectUserBody = parse_json(&body)?;
    if body.user_id <= 0 {
        return Err(ServerError::InvalidRequest("User ID is required".to_string()));
    }
    let user = existing(&state, body.user_id).await?;

    Ok((
        [(SET_COOKIE, user_cookie(user.id))],
        Json(serde_json::json!({ "success": true })),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<User>, ServerError> {
    let body: UpdateCutoffBody = parse_json(&body)?;
    let cutoff_day = u32::try_from(body.cutoff_day)
        .ok()
        .filter(|day| is_valid_cutoff_day(*day))
        .ok_or_else(|| {
            ServerError::InvalidRequest("Cutoff day must be between 1 and 30".to_string())
        })?;

    let user = state
        .repository
        .update_user_cutoff(id, cutoff_day)
        .await?
        .ok_or_else(|| ServerError::NotFound("User".to_string()))?;
    tracing::info!(user_id = id, cutoff_day, "Cutoff day updated");

    Ok(Json(user))
}

/// Deleting the current user re-selects the default one
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    let user = existing(&state, id).await?;
    if user.is_default() {
        return Err(ServerError::InvalidRequest("The default user cannot be deleted".to_string()));
    }

    let slips: Vec<String> = state
        .repository
        .list_transactions(id, u32::MAX, 0)
        .await?
        .into_iter()
        .filter_map(|tx| tx.slip_image_path)
        .filter(|reference| !reference.is_empty())
        .collect();

    if !state.repository.delete_user(id).await? {
        return Err(ServerError::NotFound("User".to_string()));
    }
    for reference in &slips {
        if let Err(e) = state.storage.delete(reference).await {
            tracing::warn!(user_id = id, image = %reference, error = %e, "Failed to delete slip");
        }
    }
    tracing::info!(user_id = id, slips = slips.len(), "User deleted");

    let reselect = (current.id() == id).then(|| (SET_COOKIE, user_cookie(state.default_user_id)));
    Ok((AppendHeaders(reselect), Json(serde_json::json!({ "success": true }))))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{as_user, get, json_request, read_json, set_cookie, TestApp};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use cash_track_core::{NewTransaction, Repository};

    fn delete(uri: &str) -> Request<Body> {
        Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_users_reissues_cookie_for_unknown_id() {
        let app = TestApp::new().await;
        let response = app.send(as_user(get("/api/users"), 999)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            set_cookie(&response),
            Some(format!("ct_user_id={}; Path=/", app.default_user_id))
        );

        let body = read_json(response).await;
        assert_eq!(body["current_user_id"], app.default_user_id);
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
        assert_eq!(body["users"][0]["name"], "default");
    }

    #[tokio::test]
    async fn test_known_cookie_is_kept() {
        let app = TestApp::new().await;
        let alice = app.user("alice").await;
        let response = app.send(as_user(get("/api/users"), alice)).await;
        assert_eq!(set_cookie(&response), None);
        assert_eq!(read_json(response).await["current_user_id"], alice);
    }

    #[tokio::test]
    async fn test_create_user_selects_it() {
        let app = TestApp::new().await;
        let response = app.send(json_request("POST", "/api/users", r#"{"name":"  Bob  "}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie(&response).unwrap();

        let body = read_json(response).await;
        assert_eq!(body["name"], "Bob");
        assert_eq!(body["cutoff_day"], 1);
        assert_eq!(cookie, format!("ct_user_id={}; Path=/", body["id"].as_i64().unwrap()));
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let app = TestApp::new().await;
        let response = app.send(json_request("POST", "/api/users", r#"{"name":"   "}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        app.user("carol").await;
        let response = app.send(json_request("POST", "/api/users", r#"{"name":"carol"}"#)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_select_user() {
        let app = TestApp::new().await;
        let alice = app.user("alice").await;

        let body = format!(r#"{{"user_id":{}}}"#, alice);
        let response = app.send(json_request("POST", "/api/users/select", &body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(set_cookie(&response), Some(format!("ct_user_id={}; Path=/", alice)));

        let response = app
            .send(json_request("POST", "/api/users/select", r#"{"user_id":4242}"#))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .send(json_request("POST", "/api/users/select", r#"{"user_id":0}"#))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_cutoff() {
        let app = TestApp::new().await;
        let uri = format!("/api/users/{}", app.default_user_id);

        let response = app.send(json_request("PATCH", &uri, r#"{"cutoff_day":25}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["cutoff_day"], 25);

        for day in ["0", "31", "-1"] {
            let body = format!(r#"{{"cutoff_day":{}}}"#, day);
            let response = app.send(json_request("PATCH", &uri, &body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "cutoff {day}");
        }

        let response = app
            .send(json_request("PATCH", "/api/users/777", r#"{"cutoff_day":5}"#))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_current_user_reselects_default() {
        let app = TestApp::new().await;
        let alice = app.user("alice").await;
        let reference = app.storage.save("a.png", b"img").await.unwrap();
        app.repository
            .create_transaction(alice, NewTransaction::pending_slip(reference.clone()))
            .await
            .unwrap();

        let response = app.send(as_user(delete(&format!("/api/users/{}", alice)), alice)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            set_cookie(&response),
            Some(format!("ct_user_id={}; Path=/", app.default_user_id))
        );

        assert!(app.repository.get_user(alice).await.unwrap().is_none());
        assert!(app.repository.list_transactions(alice, 10, 0).await.unwrap().is_empty());
        assert!(app.storage.read(&reference).await.is_err());
    }

    #[tokio::test]
    async fn test_default_user_cannot_be_deleted() {
        let app = TestApp::new().await;
        let response = app.send(delete(&format!("/api/users/{}", app.default_user_id))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.send(delete("/api/users/555")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
