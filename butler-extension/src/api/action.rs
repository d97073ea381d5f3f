//! Run Action API Handlers
//!
//! Prepare turns a target plus action config into a serializable state.
//! Start, Status and Stop receive that state, advance it and hand it back.

use axum::{Json, extract::State};
use butler_core::domain::run::{JobRun, Outcome, RunError};
use butler_core::domain::target::attributes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::api::AppState;
use crate::api::description::{self, ActionDescription, MESSAGE_TYPE};
use crate::api::error::{ApiError, ApiResult};
use crate::service::{RunRequest, check_parameters};

// =============================================================================
// Request and State Types
// =============================================================================

/// A `waitForCompletion` value, sent either as a bool or as a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    /// `None` for strings that are neither truthy nor falsy
    fn enabled(&self) -> Option<bool> {
        match self {
            Flag::Bool(value) => Some(*value),
            Flag::Text(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Job parameters, as a key/value list or a plain map
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Parameters {
    List(Vec<KeyValue>),
    Map(HashMap<String, String>),
}

impl Parameters {
    fn into_map(self) -> HashMap<String, String> {
        match self {
            Parameters::List(pairs) => pairs.into_iter().map(|kv| (kv.key, kv.value)).collect(),
            Parameters::Map(map) => map,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    pub wait_for_completion: Option<Flag>,
    pub parameters: Option<Parameters>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetRef {
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrepareRequest {
    pub target: TargetRef,
    #[serde(default)]
    pub config: ActionConfig,
}

/// State handed back and forth between the host and the action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    pub request: RunRequest,
    /// Present once the job was queued
    #[serde(default)]
    pub run: Option<JobRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateRequest {
    pub state: ActionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

fn messages(texts: Vec<String>) -> Vec<Message> {
    texts
        .into_iter()
        .map(|message| Message {
            message,
            kind: MESSAGE_TYPE.to_string(),
        })
        .collect()
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: ActionState,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: ActionState,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub messages: Vec<Message>,
}

// =============================================================================
// Action Endpoints
// =============================================================================

/// GET /actions/run
pub async fn describe() -> Json<ActionDescription> {
    Json(description::action_description())
}

/// POST /actions/run/prepare
/// Validate the target and config, warn about undeclared parameters
pub async fn prepare(
    State(state): State<AppState>,
    Json(req): Json<PrepareRequest>,
) -> ApiResult<Json<StateResponse>> {
    let wait_for_completion = match &req.config.wait_for_completion {
        None => true,
        Some(flag) => flag.enabled().ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid value for 'waitForCompletion': {:?}",
                flag
            ))
        })?,
    };
    let parameters = req
        .config
        .parameters
        .map(Parameters::into_map)
        .unwrap_or_default();

    let attrs = &req.target.attributes;
    let warning = check_parameters(
        attrs.get(attributes::PARAMETER).map(Vec::as_slice),
        &parameters,
    );

    let request = RunRequest::from_target(
        attrs,
        parameters,
        wait_for_completion,
        state.start_timeout,
    )
    .ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Target needs matching '{}' and '{}' attributes",
            attributes::NAME,
            attributes::FULL_NAME
        ))
    })?;
    tracing::debug!(job = %request.address, "Prepared job run");

    Ok(Json(StateResponse {
        state: ActionState { request, run: None },
        messages: messages(warning.into_iter().collect()),
    }))
}

/// POST /actions/run/start
pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StateRequest>,
) -> ApiResult<Json<StateResponse>> {
    let mut action = req.state;
    let started = state.execution.start(action.request.clone()).await?;
    action.run = Some(started.run);

    Ok(Json(StateResponse {
        state: action,
        messages: messages(started.messages),
    }))
}

/// POST /actions/run/status
pub async fn status(
    State(state): State<AppState>,
    Json(req): Json<StateRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let mut action = req.state;
    let run = action
        .run
        .as_mut()
        .ok_or_else(|| ApiError::BadRequest("The job run has not been started".to_string()))?;
    let report = state.execution.status(run).await?;

    Ok(Json(StatusResponse {
        state: action,
        completed: report.completed,
        outcome: report.outcome,
        error: report.error,
        messages: messages(report.messages),
    }))
}

/// POST /actions/run/stop
/// Stopping a run that never started is a no-op
pub async fn stop(
    State(state): State<AppState>,
    Json(req): Json<StateRequest>,
) -> ApiResult<Json<StopResponse>> {
    let mut action = req.state;
    let Some(run) = action.run.as_mut() else {
        return Ok(Json(StopResponse {
            outcome: None,
            messages: Vec::new(),
        }));
    };
    let report = state.execution.stop(run).await?;

    Ok(Json(StopResponse {
        outcome: report.outcome,
        messages: messages(report.messages),
    }))
}
