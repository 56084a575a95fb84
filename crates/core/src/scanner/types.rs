use serde::{Deserialize, Serialize};

/// An organization on the scanning platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    /// Display name, used for logging only.
    pub name: String,
}

/// A project reference, as returned by the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
}

/// Project details needed for ticket creation and directory lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    /// Scan-platform project name, conventionally "owner/repo:manifest".
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

impl ProjectInfo {
    /// The repository name used to look the project up in the directory:
    /// the segment of the project name before the first ':'.
    pub fn repo_name(&self) -> &str {
        self.name.split(':').next().unwrap_or(&self.name)
    }
}

/// One open vulnerability of a project.
///
/// Identity for delta computation is `(issue_id, path)`: the same issue
/// reached through different dependency paths is tracked independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub issue_id: String,
    /// Dependency path, e.g. "app@1.0.0 > lodash@4.17.15".
    pub path: String,
    pub title: String,
    pub severity: String,
    /// Exploit maturity level, e.g. "mature" or "proof-of-concept".
    pub maturity: String,
    pub package_name: String,
    pub package_version: String,
}

/// A vulnerability as fetched from the platform. `Unresolved` marks a
/// finding whose detail could not be retrieved or parsed upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VulnRecord {
    Resolved(Vulnerability),
    Unresolved(Vulnerability),
}

impl VulnRecord {
    pub fn vulnerability(&self) -> &Vulnerability {
        match self {
            VulnRecord::Resolved(v) | VulnRecord::Unresolved(v) => v,
        }
    }
}

/// Optional allow-lists applied to the project listing, each a
/// comma-separated value passed through as a query constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilters {
    pub criticality: Option<String>,
    pub environment: Option<String>,
    pub lifecycle: Option<String>,
}

impl ProjectFilters {
    pub fn is_empty(&self) -> bool {
        self.criticality.is_none() && self.environment.is_none() && self.lifecycle.is_none()
    }

    /// One-line description for log output.
    pub fn describe(&self) -> String {
        format!(
            "criticality: {} environment: {} lifecycle: {}",
            self.criticality.as_deref().unwrap_or("-"),
            self.environment.as_deref().unwrap_or("-"),
            self.lifecycle.as_deref().unwrap_or("-"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_strips_manifest() {
        let project = ProjectInfo {
            id: "p1".to_string(),
            name: "acme/billing:package.json".to_string(),
            origin: None,
            branch: None,
        };
        assert_eq!(project.repo_name(), "acme/billing");
    }

    #[test]
    fn test_repo_name_without_manifest() {
        let project = ProjectInfo {
            id: "p1".to_string(),
            name: "acme/billing".to_string(),
            origin: None,
            branch: None,
        };
        assert_eq!(project.repo_name(), "acme/billing");
    }

    #[test]
    fn test_filters_is_empty() {
        assert!(ProjectFilters::default().is_empty());
        let filters = ProjectFilters {
            criticality: Some("high".to_string()),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }
}
