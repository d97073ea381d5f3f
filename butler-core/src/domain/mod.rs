//! Core domain types
//!
//! These types describe jobs as the bridge sees them: where a job lives in the
//! folder tree, what discovery reports about it, and the state of a single run.

pub mod address;
pub mod job;
pub mod run;
pub mod target;
