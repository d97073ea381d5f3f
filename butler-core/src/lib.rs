//! Butler Core
//!
//! Core types and abstractions shared by the Butler Jenkins bridge.
//!
//! This crate contains:
//! - Domain types: job addressing, discovered jobs, targets and job runs
//! - DTOs: the Jenkins JSON payloads the bridge reads
//! - The `JobServerClient` capability implemented by `butler-client`
//! - The `Clock` capability used for start-timeout math

pub mod clock;
pub mod domain;
pub mod dto;
pub mod error;
pub mod server;

pub use clock::{Clock, FakeClock, SystemClock};
pub use domain::address::JobAddress;
pub use error::{DiscoveryError, ExecutionError, ServerError};
pub use server::JobServerClient;
