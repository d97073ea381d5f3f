//! Error types for the Butler bridge

use thiserror::Error;

/// Failure of a single call against the job server
#[derive(Debug, Clone, Error)]
pub enum ServerError {
    /// Addressed job, build or queue item does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Network, HTTP or deserialization failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered but refused the request
    #[error("Request rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the server
        message: String,
    },
}

impl ServerError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::Rejected { status: 404, .. })
    }
}

/// Errors aborting a discovery run
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to fetch jobs. {0}")]
    Fetch(#[source] ServerError),
}

/// Call errors of the execution controller
///
/// These are distinct from a run that completed with a failed outcome: a
/// transport hiccup while polling is reported here, a failed build is not.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Job, build or queue item is gone
    #[error("{title} {source}")]
    NotFound {
        title: &'static str,
        #[source]
        source: ServerError,
    },

    /// Remote call could not be completed
    #[error("{title} {source}")]
    Transport {
        title: &'static str,
        #[source]
        source: ServerError,
    },

    /// Jenkins refused to queue the job
    #[error("{title} {source}")]
    Invocation {
        title: &'static str,
        #[source]
        source: ServerError,
    },
}

impl ExecutionError {
    /// Classifies a failed lookup call
    pub fn lookup(title: &'static str, source: ServerError) -> Self {
        if source.is_not_found() {
            Self::NotFound { title, source }
        } else {
            Self::Transport { title, source }
        }
    }

    pub fn invocation(title: &'static str, source: ServerError) -> Self {
        Self::Invocation { title, source }
    }

    /// Short human-readable summary of what failed
    pub fn title(&self) -> &'static str {
        match self {
            Self::NotFound { title, .. }
            | Self::Transport { title, .. }
            | Self::Invocation { title, .. } => *title,
        }
    }

    pub fn server_error(&self) -> &ServerError {
        match self {
            Self::NotFound { source, .. }
            | Self::Transport { source, .. }
            | Self::Invocation { source, .. } => source,
        }
    }
}
