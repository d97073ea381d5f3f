//! Job and folder payloads

use serde::{Deserialize, Serialize};

/// `_class` of a CloudBees folder
pub const FOLDER_CLASS: &str = "com.cloudbees.hudson.plugins.folder.Folder";

/// Whether a tree node holds other jobs or is itself runnable
///
/// Derived once from the `_class` string. Unknown classes are treated as
/// jobs so new project types from plugins are still discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Folder,
    Job,
}

impl JobKind {
    pub fn from_class(class: &str) -> Self {
        match class {
            FOLDER_CLASS => JobKind::Folder,
            _ => JobKind::Job,
        }
    }
}

/// Entry of a `jobs` listing (root or folder)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRef {
    #[serde(rename = "_class")]
    pub class: String,
    pub name: String,
    pub url: String,
    pub color: Option<String>,
}

impl JobRef {
    pub fn kind(&self) -> JobKind {
        JobKind::from_class(&self.class)
    }
}

/// Root listing returned by `GET /api/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RootListing {
    pub jobs: Vec<JobRef>,
}

/// Full job or folder returned by `GET /job/.../api/json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobDetails {
    #[serde(rename = "_class")]
    pub class: String,
    pub name: String,
    pub display_name: String,
    pub full_name: String,
    pub full_display_name: String,
    pub url: String,
    /// Children, only present on folders
    pub jobs: Vec<JobRef>,
    pub property: Vec<JobProperty>,
}

impl JobDetails {
    pub fn kind(&self) -> JobKind {
        JobKind::from_class(&self.class)
    }

    /// Display name, falling back to the technical name when Jenkins omits it
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Names of all declared parameters, across every property block, in declaration order
    pub fn parameter_names(&self) -> Vec<String> {
        self.property
            .iter()
            .flat_map(|property| property.parameter_definitions.iter())
            .map(|definition| definition.name.clone())
            .collect()
    }
}

/// A job property block; only parameter definitions are of interest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobProperty {
    pub parameter_definitions: Vec<ParameterDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
