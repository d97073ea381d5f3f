//! Job-related API endpoints

use butler_core::JobAddress;
use butler_core::dto::build::Build;
use butler_core::dto::job::{JobDetails, JobRef, RootListing};
use reqwest::header::LOCATION;
use std::collections::HashMap;

use crate::JenkinsClient;
use crate::error::{ClientError, Result};

impl JenkinsClient {
    // =============================================================================
    // Job Tree
    // =============================================================================

    /// List the top-level jobs and folders
    pub async fn root_jobs(&self) -> Result<Vec<JobRef>> {
        let url = self.endpoint(["api", "json"])?;
        let listing: RootListing = self.get_json(url).await?;
        Ok(listing.jobs)
    }

    /// Get a job or folder by name below the given parent folders
    ///
    /// # Arguments
    /// * `name` - The job name
    /// * `parent_path` - Folder names, outermost first
    pub async fn job(&self, name: &str, parent_path: &[String]) -> Result<JobDetails> {
        let url = self.job_endpoint(name, parent_path, &["api", "json"])?;
        self.get_json(url).await
    }

    // =============================================================================
    // Builds
    // =============================================================================

    /// Queue a build of a job
    ///
    /// Uses `buildWithParameters` when parameters are given and `build` otherwise.
    ///
    /// # Returns
    /// The id of the created queue item, taken from the `Location` header
    pub async fn build_job(
        &self,
        job: &JobAddress,
        parameters: &HashMap<String, String>,
    ) -> Result<i64> {
        let action = if parameters.is_empty() {
            "build"
        } else {
            "buildWithParameters"
        };
        let url = self.job_endpoint(&job.name, &job.parent_path, &[action])?;
        let query: Vec<(&str, &str)> = parameters
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();

        let response = self.post(url, &query).await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ClientError::api_error(
                    response.status().as_u16(),
                    "Jenkins did not return a queue item location",
                )
            })?;

        parse_queue_id(location).ok_or_else(|| {
            ClientError::api_error(
                response.status().as_u16(),
                format!("Unexpected queue item location '{}'", location),
            )
        })
    }

    /// Get a build of a job by number
    pub async fn build(&self, job: &JobAddress, number: i64) -> Result<Build> {
        let number = number.to_string();
        let url = self.job_endpoint(&job.name, &job.parent_path, &[number.as_str(), "api", "json"])?;
        self.get_json(url).await
    }

    /// Abort a running build
    ///
    /// # Returns
    /// `true` if Jenkins accepted the stop request, `false` if the build is gone
    pub async fn stop(&self, build: &Build) -> Result<bool> {
        let mut url = self.rebase(&build.url)?;
        let path = format!("{}/stop", url.path().trim_end_matches('/'));
        url.set_path(&path);

        match self.post(url, &[]).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Extracts the id from a location like `http://host/queue/item/20/`
fn parse_queue_id(location: &str) -> Option<i64> {
    let path = location.trim_end_matches('/');
    let (prefix, id) = path.rsplit_once('/')?;
    if !prefix.ends_with("/queue/item") {
        return None;
    }
    id.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queue_id() {
        assert_eq!(parse_queue_id("http://localhost:8090/queue/item/20/"), Some(20));
        assert_eq!(parse_queue_id("http://localhost:8090/queue/item/21"), Some(21));
        assert_eq!(parse_queue_id("/jenkins/queue/item/7/"), Some(7));
    }

    #[test]
    fn test_parse_queue_id_rejects_other_locations() {
        assert_eq!(parse_queue_id("http://localhost:8090/job/my-job/"), None);
        assert_eq!(parse_queue_id("http://localhost:8090/queue/item/abc/"), None);
        assert_eq!(parse_queue_id(""), None);
    }
}
