//! Liveness and readiness checks.

use crate::backend::Backend;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, `ready` or `unavailable`.
    pub status: &'static str,
    /// Storage backend name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
}

/// `GET /health`: the process is up.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: None,
    })
}

/// `GET /ready`: storage answers.
pub async fn ready<B: Backend>(State(state): State<AppState<B>>) -> (StatusCode, Json<HealthResponse>) {
    if state.readiness.check().await {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready",
                backend: Some(B::NAME),
            }),
        )
    } else {
        tracing::warn!(backend = B::NAME, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                backend: Some(B::NAME),
            }),
        )
    }
}
