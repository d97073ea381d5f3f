//! Health Check API Handlers
//!
//! Liveness answers as soon as the server is up; readiness waits until
//! startup finished.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::atomic::Ordering;

use crate::api::AppState;

/// GET /health/liveness
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /health/readiness
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.ready.load(Ordering::SeqCst) {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Starting")
    }
}
