//! Job addressing
//!
//! A job is addressed by its own name plus the ordered names of the folders
//! above it. Technical full names join the segments with `/`, human-facing
//! labels join display names with ` » `.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used in technical full names (`Folder/Folder-project`)
pub const FULL_NAME_SEPARATOR: &str = "/";

/// Separator used in human-facing display paths (`This is a folder » Folder-project`)
pub const DISPLAY_NAME_SEPARATOR: &str = " » ";

/// Location of a job inside the remote folder tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAddress {
    pub name: String,
    pub parent_path: Vec<String>,
}

impl JobAddress {
    /// Creates an address for a job below the given folders
    pub fn new(name: impl Into<String>, parent_path: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parent_path,
        }
    }

    /// Creates an address for a job at the root of the tree
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Parses a `/`-joined full name back into an address
    ///
    /// The last segment is the job name, everything before it is the parent path.
    pub fn from_full_name(full_name: &str) -> Self {
        let mut segments: Vec<String> = full_name
            .split(FULL_NAME_SEPARATOR)
            .map(str::to_string)
            .collect();
        let name = segments.pop().unwrap_or_default();
        Self::new(name, segments)
    }

    /// Address of a direct child of the folder at this address
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut parent_path = self.parent_path.clone();
        parent_path.push(self.name.clone());
        Self::new(name, parent_path)
    }

    /// All segments from the outermost folder down to the job itself
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.parent_path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
    }

    /// The `/`-joined technical name
    pub fn full_name(&self) -> String {
        self.segments().collect::<Vec<_>>().join(FULL_NAME_SEPARATOR)
    }

    pub fn is_root(&self) -> bool {
        self.parent_path.is_empty()
    }
}

impl fmt::Display for JobAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Joins display names into a human-facing path
pub fn display_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(DISPLAY_NAME_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_joins_parent_path() {
        let address = JobAddress::new("Folder-project", vec!["Folder".to_string()]);
        assert_eq!(address.full_name(), "Folder/Folder-project");
        assert_eq!(address.to_string(), "Folder/Folder-project");
    }

    #[test]
    fn test_root_address() {
        let address = JobAddress::root("my-job");
        assert!(address.is_root());
        assert_eq!(address.full_name(), "my-job");
    }

    #[test]
    fn test_from_full_name() {
        let address = JobAddress::from_full_name("a/b/c");
        assert_eq!(address.name, "c");
        assert_eq!(address.parent_path, vec!["a", "b"]);

        let address = JobAddress::from_full_name("my-job");
        assert_eq!(address.name, "my-job");
        assert!(address.parent_path.is_empty());
    }

    #[test]
    fn test_child_extends_path() {
        let folder = JobAddress::new("inner", vec!["outer".to_string()]);
        let job = folder.child("build");
        assert_eq!(job.parent_path, vec!["outer", "inner"]);
        assert_eq!(job.full_name(), "outer/inner/build");
    }

    #[test]
    fn test_display_path_uses_distinct_separator() {
        assert_eq!(
            display_path(["This is a folder", "Folder-project"]),
            "This is a folder » Folder-project"
        );
        assert_eq!(display_path(["single"]), "single");
    }
}
