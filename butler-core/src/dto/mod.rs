//! Jenkins JSON payloads
//!
//! Only the fields the bridge reads are modelled. Every type tolerates
//! unknown and missing fields so newer Jenkins versions and plugins keep
//! deserializing.

pub mod build;
pub mod job;
pub mod queue;
