//! Discovery targets
//!
//! A target is the flat, attribute-based view of a discovered job that the
//! host platform selects and matches on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Target type id reported for every discovered job
pub const TARGET_TYPE_JOB: &str = "com.butler.jenkins.job";

/// Stable attribute keys
pub mod attributes {
    pub const NAME: &str = "jenkins.job.name";
    pub const FULL_NAME: &str = "jenkins.job.name.full";
    pub const FULL_DISPLAY_NAME: &str = "jenkins.job.name.full.display";
    pub const URL: &str = "jenkins.job.url";
    pub const CLASS: &str = "jenkins.job.class";
    pub const PARAMETER: &str = "jenkins.job.parameter";
}

/// A discovered job as exposed to the host platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    pub target_type: String,
    pub label: String,
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Target {
    /// First value of an attribute, if present
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}
