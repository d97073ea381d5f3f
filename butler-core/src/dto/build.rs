//! Build payloads

use serde::{Deserialize, Serialize};

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_FIXED: &str = "FIXED";
pub const STATUS_PASSED: &str = "PASSED";

/// A build, returned by `GET /job/.../{number}/api/json`
///
/// `result` is `null` while the build is running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Build {
    pub number: i64,
    pub url: String,
    pub building: bool,
    pub result: Option<String>,
    pub full_display_name: String,
}

impl Build {
    /// Remote result string, empty while none is reported
    pub fn result(&self) -> &str {
        self.result.as_deref().unwrap_or_default()
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.result(), STATUS_SUCCESS | STATUS_FIXED | STATUS_PASSED)
    }

    /// Link to the console output of this build
    pub fn console_url(&self) -> String {
        format!("{}console", self.url)
    }
}
