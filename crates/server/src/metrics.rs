//! Prometheus metrics
//!
//! Exported series:
//! - `cash_track_chat_requests_total{intent,path}`
//! - `cash_track_llm_fallback_total`
//! - `cash_track_chat_latency_seconds`
//! - `cash_track_slip_jobs_total{outcome}`
//! - `cash_track_http_requests_total{route,status}`

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Install the global recorder. Returns None if one is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

pub fn record_request(route: &str, status: StatusCode) {
    metrics::counter!(
        "cash_track_http_requests_total",
        "route" => route.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
