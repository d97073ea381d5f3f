//! Service layer
//!
//! Discovery and execution logic, independent of the HTTP surface.

pub mod discovery;
pub mod execution;

#[cfg(test)]
pub mod testing;

pub use discovery::{AttributeProjector, DiscoveryService, TreeWalker};
pub use execution::{ExecutionController, RunRequest, Started, check_parameters};
