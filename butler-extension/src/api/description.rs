//! Static descriptions of the discovery and the run action
//!
//! The host reads these once to learn which endpoints exist, how often to
//! call them and how to render targets and messages.

use axum::Json;
use butler_core::domain::target::{TARGET_TYPE_JOB, attributes};
use serde::Serialize;

/// Message type tagging every message the run action emits
pub const MESSAGE_TYPE: &str = "JENKINS";

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_interval: Option<&'static str>,
}

impl Endpoint {
    fn new(method: &'static str, path: &'static str) -> Self {
        Self {
            method,
            path,
            call_interval: None,
        }
    }

    fn every(mut self, interval: &'static str) -> Self {
        self.call_interval = Some(interval);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Index {
    pub discoveries: Vec<Endpoint>,
    pub actions: Vec<Endpoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluralLabel {
    pub one: &'static str,
    pub other: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryDescription {
    pub id: &'static str,
    pub discover: Endpoint,
}

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub attribute: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBy {
    pub attribute: &'static str,
    pub direction: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub columns: Vec<Column>,
    pub order_by: Vec<OrderBy>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetDescription {
    pub id: &'static str,
    pub version: &'static str,
    pub label: PluralLabel,
    pub category: &'static str,
    pub table: Table,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeDescription {
    pub attribute: &'static str,
    pub label: PluralLabel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameter {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<&'static str>,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub title: &'static str,
    pub message_type: &'static str,
    pub append: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescription {
    pub id: String,
    pub label: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub target_type: &'static str,
    pub technology: &'static str,
    pub parameters: Vec<ActionParameter>,
    pub prepare: Endpoint,
    pub start: Endpoint,
    pub status: Endpoint,
    pub stop: Endpoint,
    pub widgets: Vec<Widget>,
}

/// GET /
pub async fn index() -> Json<Index> {
    Json(Index {
        discoveries: vec![Endpoint::new("GET", "/discovery/jobs")],
        actions: vec![Endpoint::new("GET", "/actions/run")],
    })
}

pub fn discovery_description() -> DiscoveryDescription {
    DiscoveryDescription {
        id: TARGET_TYPE_JOB,
        discover: Endpoint::new("GET", "/discovery/jobs/discovered-targets").every("1m"),
    }
}

pub fn target_description() -> TargetDescription {
    TargetDescription {
        id: TARGET_TYPE_JOB,
        version: VERSION,
        label: PluralLabel {
            one: "Job",
            other: "Jobs",
        },
        category: "Jenkins",
        table: Table {
            columns: vec![Column {
                attribute: attributes::FULL_DISPLAY_NAME,
            }],
            order_by: vec![OrderBy {
                attribute: attributes::FULL_DISPLAY_NAME,
                direction: "ASC",
            }],
        },
    }
}

pub fn attribute_descriptions() -> Vec<AttributeDescription> {
    [
        (attributes::NAME, "Job name", "Job names"),
        (attributes::FULL_NAME, "Job full name", "Job full names"),
        (attributes::FULL_DISPLAY_NAME, "Job display name", "Job display names"),
        (attributes::URL, "Job url", "Job urls"),
        (attributes::CLASS, "Job class", "Job classes"),
        (attributes::PARAMETER, "Job parameter", "Job parameters"),
    ]
    .into_iter()
    .map(|(attribute, one, other)| AttributeDescription {
        attribute,
        label: PluralLabel { one, other },
    })
    .collect()
}

pub fn action_description() -> ActionDescription {
    ActionDescription {
        id: format!("{}.run", TARGET_TYPE_JOB),
        label: "Run Jenkins Job",
        description: "Starts a Jenkins job.",
        version: VERSION,
        target_type: TARGET_TYPE_JOB,
        technology: "Jenkins",
        parameters: vec![
            ActionParameter {
                name: "duration",
                label: "Estimated Duration",
                description: "If `Wait for Completion` is checked, the step will run as long as needed. Used to size the step in the editor.",
                kind: "duration",
                default_value: Some("60s"),
                required: true,
            },
            ActionParameter {
                name: "waitForCompletion",
                label: "Wait for Completion",
                description: "If enabled, the action waits for the job to complete. If disabled, it returns as soon as the job started.",
                kind: "boolean",
                default_value: Some("true"),
                required: true,
            },
            ActionParameter {
                name: "parameters",
                label: "Parameters",
                description: "Optional parameters to pass to the job.",
                kind: "key_value",
                default_value: None,
                required: false,
            },
        ],
        prepare: Endpoint::new("POST", "/actions/run/prepare"),
        start: Endpoint::new("POST", "/actions/run/start"),
        status: Endpoint::new("POST", "/actions/run/status").every("2s"),
        stop: Endpoint::new("POST", "/actions/run/stop"),
        widgets: vec![Widget {
            title: "Jenkins",
            message_type: MESSAGE_TYPE,
            append: true,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_description() {
        let description = serde_json::to_value(action_description()).unwrap();
        assert_eq!(description["id"], "com.butler.jenkins.job.run");
        assert_eq!(description["status"]["callInterval"], "2s");
        assert_eq!(description["widgets"][0]["messageType"], "JENKINS");
        assert_eq!(description["parameters"][1]["defaultValue"], "true");
        assert!(description["stop"].get("callInterval").is_none());
    }

    #[test]
    fn test_attribute_descriptions_cover_every_key() {
        let keys: Vec<_> = attribute_descriptions().iter().map(|a| a.attribute).collect();
        assert_eq!(keys.len(), 6);
        assert!(keys.contains(&attributes::PARAMETER));
    }

    #[test]
    fn test_target_description_orders_by_display_name() {
        let description = serde_json::to_value(target_description()).unwrap();
        assert_eq!(description["label"]["one"], "Job");
        assert_eq!(description["table"]["orderBy"][0]["attribute"], attributes::FULL_DISPLAY_NAME);
        assert_eq!(description["table"]["orderBy"][0]["direction"], "ASC");
    }
}
