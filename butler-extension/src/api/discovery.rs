//! Discovery API Handlers

use axum::{Json, extract::State};
use butler_core::domain::target::Target;
use serde::Serialize;

use crate::api::AppState;
use crate::api::description::{
    self, AttributeDescription, DiscoveryDescription, TargetDescription,
};

#[derive(Debug, Serialize)]
pub struct DiscoveredTargets {
    pub targets: Vec<Target>,
}

/// GET /discovery/jobs
pub async fn describe() -> Json<DiscoveryDescription> {
    Json(description::discovery_description())
}

/// GET /discovery/jobs/target-description
pub async fn describe_target() -> Json<TargetDescription> {
    Json(description::target_description())
}

/// GET /discovery/jobs/attribute-descriptions
pub async fn describe_attributes() -> Json<Vec<AttributeDescription>> {
    Json(description::attribute_descriptions())
}

/// GET /discovery/jobs/discovered-targets
/// Serves the cached targets; the background refresh keeps them current
pub async fn discovered_targets(State(state): State<AppState>) -> Json<DiscoveredTargets> {
    let targets = state.discovery.targets().await;
    tracing::debug!(targets = targets.len(), "Serving discovered targets");
    Json(DiscoveredTargets { targets })
}
