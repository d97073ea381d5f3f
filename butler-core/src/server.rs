//! Job server capability
//!
//! The bridge never talks HTTP directly; discovery and execution only see this
//! trait. `butler-client` implements it against the Jenkins JSON API, tests
//! implement it in memory.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::address::JobAddress;
use crate::dto::build::Build;
use crate::dto::job::{JobDetails, JobRef};
use crate::dto::queue::QueueItem;
use crate::error::ServerError;

/// Result type alias for job server calls
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Operations the bridge needs from a remote CI server
///
/// Every call may fail with a transport or not-found error. Dropping the
/// returned future abandons the in-flight request.
#[async_trait]
pub trait JobServerClient: Send + Sync {
    /// Lists the top-level entries of the job tree
    async fn list_root_jobs(&self) -> ServerResult<Vec<JobRef>>;

    /// Resolves a job or folder below the given parent folders
    async fn get_job(&self, name: &str, parent_path: &[String]) -> ServerResult<JobDetails>;

    /// Queues a run of the job and returns the queue item id
    async fn invoke_job(
        &self,
        job: &JobAddress,
        parameters: &HashMap<String, String>,
    ) -> ServerResult<i64>;

    /// Fetches a queue item by id
    async fn get_queue_item(&self, id: i64) -> ServerResult<QueueItem>;

    /// Fetches a build of the job by number
    async fn get_build(&self, job: &JobAddress, number: i64) -> ServerResult<Build>;

    /// Cancels a queued task; `true` if the server accepted the request
    async fn cancel_queue_item(&self, id: i64) -> ServerResult<bool>;

    /// Aborts a running build; `true` if the server accepted the request
    async fn stop_build(&self, build: &Build) -> ServerResult<bool>;
}
