//! Butler Extension
//!
//! Exposes Jenkins jobs to an external orchestrator.
//!
//! Architecture:
//! - Configuration: command-line flags with environment variable fallbacks
//! - Services: job-tree discovery and the job run state machine
//! - API: HTTP endpoints for Describe/Discover/Prepare/Start/Status/Stop
//!
//! The orchestrator polls discovery for targets, then drives a single job
//! run through Start, repeated Status calls and an optional Stop.

pub mod api;
pub mod config;
pub mod service;
