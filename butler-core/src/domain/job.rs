//! Discovered job domain type

use serde::{Deserialize, Serialize};

use crate::domain::address::{JobAddress, display_path};
use crate::dto::job::JobDetails;

/// A runnable job found while walking the remote tree
///
/// Rebuilt from scratch on every discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredJob {
    pub address: JobAddress,
    pub full_name: String,
    pub full_display_name: String,
    pub url: String,
    pub class: String,
    pub parameter_names: Vec<String>,
}

impl DiscoveredJob {
    /// Builds a discovered job from its resolved details
    ///
    /// `folder_labels` are the display names of the enclosing folders, outermost
    /// first. They are only used when Jenkins does not report a full display name.
    pub fn from_details(address: JobAddress, details: &JobDetails, folder_labels: &[String]) -> Self {
        let full_display_name = if details.full_display_name.is_empty() {
            display_path(
                folder_labels
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(details.label())),
            )
        } else {
            details.full_display_name.clone()
        };

        Self {
            full_name: address.full_name(),
            full_display_name,
            url: details.url.clone(),
            class: details.class.clone(),
            parameter_names: details.parameter_names(),
            address,
        }
    }
}
