//! Job run domain types
//!
//! A `JobRun` is the per-invocation state of the execution controller. The
//! host keeps it between calls and hands it back for every Status and Stop,
//! so it is fully serializable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::address::JobAddress;

/// State of one job invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRun {
    pub address: JobAddress,
    pub wait_for_completion: bool,
    pub parameters: HashMap<String, String>,
    /// Queue item id, 0 until queued
    pub queue_id: i64,
    /// Build number, 0 until an executor picked the task up
    pub build_number: i64,
    /// Set once the run reached a state Stop must not touch
    pub dont_stop: bool,
    /// Start deadline, as an offset from the clock reference
    pub deadline: Duration,
}

impl JobRun {
    pub fn new(
        address: JobAddress,
        wait_for_completion: bool,
        parameters: HashMap<String, String>,
        queue_id: i64,
        deadline: Duration,
    ) -> Self {
        Self {
            address,
            wait_for_completion,
            parameters,
            queue_id,
            build_number: 0,
            dont_stop: false,
            deadline,
        }
    }

    pub fn has_started(&self) -> bool {
        self.build_number != 0
    }
}

/// Classified result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Succeeded,
    Failed,
    Errored,
    TimedOut,
    Cancelled,
}

impl Outcome {
    /// How the host should flag a run ending with this outcome
    pub fn error_status(self) -> Option<ErrorStatus> {
        match self {
            Outcome::Succeeded | Outcome::Cancelled => None,
            Outcome::Failed => Some(ErrorStatus::Failed),
            Outcome::Errored | Outcome::TimedOut => Some(ErrorStatus::Errored),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    Failed,
    Errored,
}

/// Error attached to a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub status: ErrorStatus,
    pub title: String,
}

/// Answer of a single Status poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub completed: bool,
    pub outcome: Option<Outcome>,
    pub error: Option<RunError>,
    pub messages: Vec<String>,
}

impl StatusReport {
    /// Run still in progress
    pub fn pending(messages: Vec<String>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Run finished; the error is derived from the outcome
    pub fn finished(outcome: Outcome, title: impl Into<String>, messages: Vec<String>) -> Self {
        let error = outcome.error_status().map(|status| RunError {
            status,
            title: title.into(),
        });
        Self {
            completed: true,
            outcome: Some(outcome),
            error,
            messages,
        }
    }
}

/// Answer of a Stop call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopReport {
    /// `Cancelled` when the server accepted a cancel or stop request
    pub outcome: Option<Outcome>,
    pub messages: Vec<String>,
}
