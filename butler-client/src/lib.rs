//! Butler Jenkins Client
//!
//! A `reqwest` implementation of [`JobServerClient`] against the Jenkins JSON API.
//!
//! # Example
//!
//! ```no_run
//! use butler_client::{ClientOptions, Credentials, JenkinsClient};
//! use butler_core::JobServerClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = JenkinsClient::with_options(
//!     "https://ci.jenkins.io",
//!     ClientOptions {
//!         credentials: Some(Credentials::new("admin", "123xyz")),
//!         ..Default::default()
//!     },
//! )?;
//!
//! for job in client.list_root_jobs().await? {
//!     println!("{}", job.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
mod jobs;
mod queue;

pub use error::{ClientError, Result};

use async_trait::async_trait;
use butler_core::dto::build::Build;
use butler_core::dto::job::{JobDetails, JobRef};
use butler_core::dto::queue::QueueItem;
use butler_core::server::{JobServerClient, ServerResult};
use butler_core::JobAddress;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// API user and token used for basic authentication
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            token: token.into(),
        }
    }
}

/// Connection settings for [`JenkinsClient::with_options`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub credentials: Option<Credentials>,
    /// Accept self-signed or otherwise invalid certificates
    pub insecure_skip_verify: bool,
    /// Upper bound for every single request
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            credentials: None,
            insecure_skip_verify: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// CSRF crumb handed out by `/crumbIssuer/api/json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Crumb {
    crumb: String,
    crumb_request_field: String,
}

/// HTTP client for the Jenkins JSON API
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    /// Base URL of Jenkins, always ending with `/`
    base_url: Url,
    /// HTTP client instance
    client: Client,
    credentials: Option<Credentials>,
}

impl JenkinsClient {
    /// Create a client with default options and no credentials
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a client with credentials, TLS and timeout settings
    pub fn with_options(base_url: &str, options: ClientOptions) -> Result<Self> {
        if options.insecure_skip_verify {
            tracing::info!(
                "TLS verification disabled for Jenkins connection. Self-signed certificates will be accepted."
            );
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure_skip_verify)
            .build()?;

        let mut jenkins = Self::with_client(base_url, client)?;
        jenkins.credentials = options.credentials;
        Ok(jenkins)
    }

    /// Create a client around a preconfigured reqwest client
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidRequest(format!(
                "Base URL '{}' cannot carry a path",
                base_url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            client,
            credentials: None,
        })
    }

    /// Get the base URL of Jenkins
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Verifies that Jenkins is reachable and the credentials are accepted
    pub async fn connect(&self) -> Result<()> {
        let jobs = self.root_jobs().await?;
        tracing::info!(
            base_url = %self.base_url,
            jobs = jobs.len(),
            "Connected to Jenkins"
        );
        Ok(())
    }

    // =============================================================================
    // URL Helpers
    // =============================================================================

    /// Appends path segments to the base URL, percent-encoding each one
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest(format!("Base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a job resource, e.g. `/job/Folder/job/Folder-project/<suffix...>`
    fn job_endpoint<'a>(
        &self,
        name: &'a str,
        parent_path: &'a [String],
        suffix: &[&'a str],
    ) -> Result<Url> {
        let segments = parent_path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .flat_map(|segment| ["job", segment])
            .chain(suffix.iter().copied());
        self.endpoint(segments)
    }

    /// Maps a URL reported by Jenkins onto the configured base URL
    ///
    /// Jenkins reports absolute URLs using its own configured root URL, which
    /// is not necessarily the address this client reaches it under.
    fn rebase(&self, reported: &str) -> Result<Url> {
        match Url::parse(reported) {
            Ok(remote) => {
                let mut url = self.base_url.clone();
                url.set_path(remote.path());
                Ok(url)
            }
            Err(_) => self
                .base_url
                .join(reported.trim_start_matches('/'))
                .map_err(|e| ClientError::InvalidRequest(format!("Invalid URL '{}': {}", reported, e))),
        }
    }

    // =============================================================================
    // Request Helpers
    // =============================================================================

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(credentials) => request.basic_auth(&credentials.user, Some(&credentials.token)),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self.authorize(self.client.get(url)).send().await?;
        self.handle_response(response).await
    }

    /// POST with an optional CSRF crumb; returns the raw response after the status check
    async fn post(&self, url: Url, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        tracing::debug!(%url, "POST");
        let mut request = self.authorize(self.client.post(url)).query(query);
        if let Some(crumb) = self.crumb().await? {
            request = request.header(crumb.crumb_request_field.as_str(), crumb.crumb);
        }
        let response = request.send().await?;
        self.check_status(response).await
    }

    /// Fetches a CSRF crumb; `None` when the crumb issuer is disabled
    async fn crumb(&self) -> Result<Option<Crumb>> {
        let url = self.endpoint(["crumbIssuer", "api", "json"])?;
        match self.get_json::<Crumb>(url).await {
            Ok(crumb) => Ok(Some(crumb)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Turns non-success status codes into errors
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }

        let url = response.url().to_string();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ClientError::api_error(status.as_u16(), error_text))
    }
}

#[async_trait]
impl JobServerClient for JenkinsClient {
    async fn list_root_jobs(&self) -> ServerResult<Vec<JobRef>> {
        Ok(self.root_jobs().await?)
    }

    async fn get_job(&self, name: &str, parent_path: &[String]) -> ServerResult<JobDetails> {
        Ok(self.job(name, parent_path).await?)
    }

    async fn invoke_job(
        &self,
        job: &JobAddress,
        parameters: &HashMap<String, String>,
    ) -> ServerResult<i64> {
        Ok(self.build_job(job, parameters).await?)
    }

    async fn get_queue_item(&self, id: i64) -> ServerResult<QueueItem> {
        Ok(self.queue_item(id).await?)
    }

    async fn get_build(&self, job: &JobAddress, number: i64) -> ServerResult<Build> {
        Ok(self.build(job, number).await?)
    }

    async fn cancel_queue_item(&self, id: i64) -> ServerResult<bool> {
        Ok(self.cancel(id).await?)
    }

    async fn stop_build(&self, build: &Build) -> ServerResult<bool> {
        Ok(self.stop(build).await?)
    }
}
