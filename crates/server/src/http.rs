//! HTTP Endpoints
//!
//! Router, middleware stack and the health, readiness and metrics handlers.

use axum::extract::{DefaultBodyLimit, MatchedPath, Request, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::metrics::{metrics_handler, record_request};
use crate::state::AppState;
use crate::user_context::user_context;
use crate::{chat, dashboard, transactions, users};

const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let max_upload_bytes = server.max_upload_bytes;
    // one OCR call and one model call, back to back
    let upstream_seconds = state.config.ocr.timeout_seconds + state.config.llm.timeout_seconds;
    let request_timeout = Duration::from_secs(upstream_seconds + 5);

    let api = Router::new()
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/transactions/slip",
            post(transactions::upload_slip).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/transactions/recent", get(transactions::recent))
        .route(
            "/api/transactions/:id",
            get(transactions::get_transaction).delete(transactions::delete_transaction),
        )
        .route("/api/transactions/:id/confirm", patch(transactions::confirm))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/select", post(users::select_user))
        .route("/api/users/:id", patch(users::update_user).delete(users::delete_user))
        .route("/api/dashboard/summary", get(dashboard::summary))
        .route("/api/dashboard/by-category", get(dashboard::by_category))
        .route("/api/dashboard/by-channel", get(dashboard::by_channel))
        .route("/api/dashboard/transactions", get(dashboard::transactions))
        .route_layer(middleware::from_fn_with_state(state.clone(), user_context));

    let upload_dir = state.storage.base_dir().to_path_buf();

    Router::new()
        .merge(api)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(middleware::from_fn(track_requests))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to the local UI origin
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let methods = [Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS];

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(DEFAULT_ORIGIN))
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

/// Count requests by matched route and status
async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string());

    let response = next.run(request).await;
    if let Some(route) = route {
        record_request(&route, response.status());
    }
    response
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Probes each collaborator; always 200 with an overall `ready` flag
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut checks = serde_json::Map::new();
    let mut ready = true;

    for probe in &state.probes {
        let ok = matches!(
            tokio::time::timeout(Duration::from_secs(2), probe.is_ready()).await,
            Ok(true)
        );
        ready &= ok;
        checks.insert(
            probe.name().to_string(),
            serde_json::json!({ "status": if ok { "ok" } else { "unavailable" } }),
        );
    }

    let database_ok = state.repository.get_user(state.default_user_id).await.is_ok();
    ready &= database_ok;
    checks.insert(
        "database".to_string(),
        serde_json::json!({ "status": if database_ok { "ok" } else { "unavailable" } }),
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "ready": ready,
            "checks": checks,
        })),
    )
}
