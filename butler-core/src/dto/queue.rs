//! Queue item payloads

use serde::{Deserialize, Serialize};

/// A queued task, returned by `GET /queue/item/{id}/api/json`
///
/// `executable` stays `null` until Jenkins assigns the task to an executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueItem {
    pub id: i64,
    pub url: String,
    pub why: Option<String>,
    pub cancelled: bool,
    pub executable: Option<Executable>,
}

impl QueueItem {
    /// Number of the build started from this item, or 0 if none yet
    pub fn build_number(&self) -> i64 {
        self.executable
            .as_ref()
            .map(|executable| executable.number)
            .unwrap_or(0)
    }
}

/// Reference to the build a queue item turned into
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Executable {
    pub number: i64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_number_without_executable() {
        let item: QueueItem =
            serde_json::from_str(r#"{"id": 20, "why": "Waiting for next available executor", "executable": null}"#)
                .unwrap();
        assert_eq!(item.build_number(), 0);
        assert_eq!(item.why.as_deref(), Some("Waiting for next available executor"));
    }

    #[test]
    fn test_build_number_with_executable() {
        let item: QueueItem = serde_json::from_str(
            r#"{
                "_class": "hudson.model.Queue$LeftItem",
                "id": 21,
                "cancelled": false,
                "executable": {
                    "_class": "hudson.model.FreeStyleBuild",
                    "number": 9,
                    "url": "http://localhost:8090/job/Example%20Job/9/"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(item.build_number(), 9);
    }
}
