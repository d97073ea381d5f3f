//! API Module
//!
//! HTTP surface of the extension.
//! Each submodule handles endpoints for a specific concern.

pub mod action;
pub mod description;
pub mod discovery;
pub mod error;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::service::{DiscoveryService, ExecutionController};

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<DiscoveryService>,
    pub execution: Arc<ExecutionController>,
    pub start_timeout: Duration,
    /// Flipped once startup completed
    pub ready: Arc<AtomicBool>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(description::index))
        // Health checks
        .route("/health/liveness", get(health::liveness))
        .route("/health/readiness", get(health::readiness))
        // Discovery endpoints
        .route("/discovery/jobs", get(discovery::describe))
        .route("/discovery/jobs/target-description", get(discovery::describe_target))
        .route(
            "/discovery/jobs/attribute-descriptions",
            get(discovery::describe_attributes),
        )
        .route(
            "/discovery/jobs/discovered-targets",
            get(discovery::discovered_targets),
        )
        // Action endpoints
        .route("/actions/run", get(action::describe))
        .route("/actions/run/prepare", post(action::prepare))
        .route("/actions/run/start", post(action::start))
        .route("/actions/run/status", post(action::status))
        .route("/actions/run/stop", post(action::stop))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
