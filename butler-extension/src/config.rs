//! Extension configuration
//!
//! Every setting can be given as a flag or through its environment variable.
//! The parsed value is threaded into the services; nothing reads it globally.

use anyhow::bail;
use butler_client::{ClientOptions, Credentials};
use butler_core::domain::target::attributes;
use clap::Parser;
use std::time::Duration;

/// Extension configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "butler-extension")]
#[command(about = "Discovers Jenkins jobs and runs them on request", long_about = None)]
pub struct Config {
    /// Jenkins base URL, like 'https://ci.jenkins.io'
    #[arg(long, env = "JENKINS_BASE_URL")]
    pub base_url: String,

    /// Jenkins API user
    #[arg(long, env = "JENKINS_API_USER")]
    pub api_user: String,

    /// Jenkins API token
    #[arg(long, env = "JENKINS_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Skip TLS verification when connecting to Jenkins
    #[arg(long, env = "JENKINS_INSECURE_SKIP_VERIFY")]
    pub insecure_skip_verify: bool,

    /// Time a queued job may take to start before the run errors
    #[arg(long, env = "JOB_START_TIMEOUT_SECONDS", default_value_t = 60)]
    pub job_start_timeout_seconds: u64,

    /// Target attributes to drop from discovery, e.g. 'jenkins.job.url'
    #[arg(long, env = "DISCOVERY_ATTRIBUTES_EXCLUDES_JOB", value_delimiter = ',')]
    pub discovery_attributes_excludes_job: Vec<String>,

    /// How often the job tree is rediscovered
    #[arg(long, env = "DISCOVERY_INTERVAL_SECONDS", default_value_t = 300)]
    pub discovery_interval_seconds: u64,

    /// Upper bound for a single Jenkins request
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 30)]
    pub request_timeout_seconds: u64,

    /// Address the HTTP API listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8082")]
    pub bind_addr: String,
}

impl Config {
    pub fn job_start_timeout(&self) -> Duration {
        Duration::from_secs(self.job_start_timeout_seconds)
    }

    pub fn discovery_interval(&self) -> Duration {
        Duration::from_secs(self.discovery_interval_seconds)
    }

    /// Connection settings for the Jenkins client
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            credentials: Some(Credentials::new(&self.api_user, &self.api_token)),
            insecure_skip_verify: self.insecure_skip_verify,
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.is_empty() {
            bail!("base_url cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            bail!("base_url must start with http:// or https://");
        }

        if self.api_user.is_empty() || self.api_token.is_empty() {
            bail!("api_user and api_token must be set");
        }

        if self.job_start_timeout_seconds == 0 {
            bail!("job_start_timeout_seconds must be greater than 0");
        }

        if self.discovery_interval_seconds == 0 {
            bail!("discovery_interval_seconds must be greater than 0");
        }

        if self.request_timeout_seconds == 0 {
            bail!("request_timeout_seconds must be greater than 0");
        }

        // The run action addresses jobs through these two attributes
        for required in [attributes::NAME, attributes::FULL_NAME] {
            if self
                .discovery_attributes_excludes_job
                .iter()
                .any(|key| key.trim() == required)
            {
                bail!("'{}' cannot be excluded from discovery", required);
            }
        }

        Ok(())
    }
}
