//! Job execution state machine
//!
//! `ExecutionController` drives one `JobRun` through queued, started and
//! finished. It never loops or sleeps itself: the host calls Status on its own
//! interval and Stop when it aborts.

use butler_core::domain::run::{JobRun, Outcome, StatusReport, StopReport};
use butler_core::domain::target::attributes;
use butler_core::dto::build::Build;
use butler_core::{Clock, ExecutionError, JobAddress, JobServerClient, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Everything needed to start a run, derived from a target and the action config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub address: JobAddress,
    pub parameters: HashMap<String, String>,
    pub wait_for_completion: bool,
    pub start_timeout: Duration,
}

impl RunRequest {
    /// Builds a request from target attributes
    ///
    /// The parent folders come from the full name, so both attributes are
    /// required and must agree. Returns `None` otherwise.
    pub fn from_target(
        target_attributes: &BTreeMap<String, Vec<String>>,
        parameters: HashMap<String, String>,
        wait_for_completion: bool,
        start_timeout: Duration,
    ) -> Option<Self> {
        let first = |key: &str| {
            target_attributes
                .get(key)
                .and_then(|values| values.first())
                .filter(|value| !value.is_empty())
        };
        let name = first(attributes::NAME)?;
        let full_name = JobAddress::from_full_name(first(attributes::FULL_NAME)?);
        if full_name.name != *name {
            return None;
        }
        let parent_path = full_name.parent_path;

        Some(Self {
            address: JobAddress::new(name.clone(), parent_path),
            parameters,
            wait_for_completion,
            start_timeout,
        })
    }
}

/// Result of a successful Start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    pub run: JobRun,
    pub messages: Vec<String>,
}

/// Warning for parameters the job does not declare, if any
///
/// Invocation always proceeds with the provided parameters.
pub fn check_parameters(
    declared: Option<&[String]>,
    provided: &HashMap<String, String>,
) -> Option<String> {
    if provided.is_empty() {
        return None;
    }

    let declared = declared.unwrap_or_default();
    if declared.is_empty() {
        return Some(
            "- ⚠️ This job does not have any parameters defined, but parameters were provided."
                .to_string(),
        );
    }

    let mut undeclared: Vec<&str> = provided
        .keys()
        .filter(|key| !declared.contains(*key))
        .map(String::as_str)
        .collect();
    if undeclared.is_empty() {
        return None;
    }
    undeclared.sort_unstable();

    Some(format!(
        "- ⚠️ The following parameters are not defined for this job: {}",
        undeclared.join(", ")
    ))
}

fn build_links(build: &Build, open_label: &str) -> String {
    format!(
        "[{}]({}) [Console]({})",
        open_label,
        build.url,
        build.console_url()
    )
}

/// Start/Status/Stop lifecycle for job runs
pub struct ExecutionController<C: Clock = SystemClock> {
    client: Arc<dyn JobServerClient>,
    clock: C,
}

impl ExecutionController<SystemClock> {
    pub fn new(client: Arc<dyn JobServerClient>) -> Self {
        Self::with_clock(client, SystemClock::new())
    }
}

impl<C: Clock> ExecutionController<C> {
    pub fn with_clock(client: Arc<dyn JobServerClient>, clock: C) -> Self {
        Self { client, clock }
    }

    /// Resolves the job, queues it and returns the fresh run
    ///
    /// Does not wait for the queue item to resolve.
    pub async fn start(&self, request: RunRequest) -> Result<Started, ExecutionError> {
        let RunRequest {
            address,
            parameters,
            wait_for_completion,
            start_timeout,
        } = request;
        tracing::info!(job = %address, "Starting job.");

        self.client
            .get_job(&address.name, &address.parent_path)
            .await
            .map_err(|e| ExecutionError::lookup("Failed to find job.", e))?;

        let queue_id = self
            .client
            .invoke_job(&address, &parameters)
            .await
            .map_err(|e| ExecutionError::invocation("Failed to queue job.", e))?;
        tracing::info!(job = %address, queue_id, "Job queued successfully.");

        let deadline = self.clock.elapsed() + start_timeout;
        Ok(Started {
            run: JobRun::new(address, wait_for_completion, parameters, queue_id, deadline),
            messages: vec!["- Waiting for job to start...".to_string()],
        })
    }

    /// Polls the remote state once and advances the run
    pub async fn status(&self, run: &mut JobRun) -> Result<StatusReport, ExecutionError> {
        if run.has_started() {
            self.poll_build(run).await
        } else {
            self.poll_queue(run).await
        }
    }

    async fn poll_queue(&self, run: &mut JobRun) -> Result<StatusReport, ExecutionError> {
        let item = self
            .client
            .get_queue_item(run.queue_id)
            .await
            .map_err(|e| ExecutionError::lookup("Failed to fetch task.", e))?;

        let number = item.build_number();
        if number == 0 {
            if self.clock.elapsed() > run.deadline {
                tracing::warn!(job = %run.address, queue_id = run.queue_id, "Timed out waiting for job to start.");
                return Ok(StatusReport::finished(
                    Outcome::TimedOut,
                    "Timed out waiting for job to start.",
                    Vec::new(),
                ));
            }
            tracing::info!(job = %run.address, queue_id = run.queue_id, "Job is queued, waiting for start.");
            return Ok(StatusReport::pending(Vec::new()));
        }

        let build = self.fetch_build(&run.address, number).await?;
        run.build_number = number;

        if !run.wait_for_completion {
            tracing::info!(
                job = %run.address,
                build_number = number,
                "Job started, action will not wait for completion."
            );
            run.dont_stop = true;
            return Ok(StatusReport::finished(
                Outcome::Succeeded,
                "",
                vec![format!(
                    "- Job started, action will not wait for completion. {}",
                    build_links(&build, "Build")
                )],
            ));
        }

        // A build that already finished is reported on the next poll
        tracing::info!(job = %run.address, build_number = number, "Job started.");
        Ok(StatusReport::pending(vec![format!(
            "- Job started. {}",
            build_links(&build, "Open")
        )]))
    }

    async fn poll_build(&self, run: &mut JobRun) -> Result<StatusReport, ExecutionError> {
        let build = self.fetch_build(&run.address, run.build_number).await?;
        if build.building {
            return Ok(StatusReport::pending(Vec::new()));
        }

        run.dont_stop = true;
        let result = build.result();
        tracing::info!(job = %run.address, build_number = run.build_number, result, "Job completed.");

        if build.is_successful() {
            Ok(StatusReport::finished(
                Outcome::Succeeded,
                "",
                vec![format!("- Job ended with result '{}' ✅", result)],
            ))
        } else {
            Ok(StatusReport::finished(
                Outcome::Failed,
                format!("Job ended with result: {}", result),
                vec![format!("- Job ended with result '{}' ⚠️", result)],
            ))
        }
    }

    /// Cancels the queued task and aborts the build if one started
    ///
    /// Cancel and abort requests are best-effort; only failed lookups fail
    /// the call. Finished and fire-and-forget runs are left alone.
    pub async fn stop(&self, run: &mut JobRun) -> Result<StopReport, ExecutionError> {
        if run.dont_stop {
            return Ok(StopReport::default());
        }

        let mut report = StopReport::default();
        let item = self
            .client
            .get_queue_item(run.queue_id)
            .await
            .map_err(|e| ExecutionError::lookup("Failed to fetch task.", e))?;

        let number = match item.build_number() {
            0 => run.build_number,
            number => number,
        };

        match self.client.cancel_queue_item(run.queue_id).await {
            Ok(true) => {
                tracing::info!(job = %run.address, queue_id = run.queue_id, "Task canceled.");
                // Jenkins also accepts cancelling an item that already left the queue
                if number == 0 {
                    report.outcome = Some(Outcome::Cancelled);
                    report.messages.push("- Queued job cancelled. 🛑".to_string());
                }
            }
            Ok(false) => {
                tracing::info!(job = %run.address, queue_id = run.queue_id, "Task was not canceled.");
            }
            Err(e) => {
                tracing::warn!(job = %run.address, queue_id = run.queue_id, error = %e, "Failed to cancel the task.");
            }
        }

        if number != 0 {
            let build = self.fetch_build(&run.address, number).await?;
            run.build_number = number;
            match self.client.stop_build(&build).await {
                Ok(true) => {
                    tracing::info!(job = %run.address, build_number = number, "Job stopped.");
                    report.outcome = Some(Outcome::Cancelled);
                    report.messages.push("- Job stopped. 🛑".to_string());
                }
                Ok(false) => {
                    tracing::info!(job = %run.address, build_number = number, "Job was not stopped.");
                }
                Err(e) => {
                    tracing::warn!(job = %run.address, build_number = number, error = %e, "Failed to stop build.");
                }
            }
        }

        Ok(report)
    }

    async fn fetch_build(&self, address: &JobAddress, number: i64) -> Result<Build, ExecutionError> {
        self.client
            .get_build(address, number)
            .await
            .map_err(|e| ExecutionError::lookup("Failed to fetch build.", e))
    }
}
