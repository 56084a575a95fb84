use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scanner::ProjectFilters;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub scan: ScanConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub run: RunConfig,
    /// Known-organization catalog (display name -> org id). Injected here
    /// rather than hardcoded so tests can use synthetic organizations.
    #[serde(default)]
    pub orgs: BTreeMap<String, String>,
}

/// Scan platform configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// API endpoint, e.g. "https://api.snyk.io"
    pub endpoint: String,
    /// API token (required)
    pub api_token: String,
    /// Pin the run to a single organization id
    #[serde(default)]
    pub org_id: Option<String>,
    /// Pin the run to a single project id
    #[serde(default)]
    pub project_id: Option<String>,
    /// Comma-separated business criticality allow-list
    #[serde(default)]
    pub criticality: Option<String>,
    /// Comma-separated environment allow-list
    #[serde(default)]
    pub environment: Option<String>,
    /// Comma-separated lifecycle allow-list
    #[serde(default)]
    pub lifecycle: Option<String>,
    /// Comma-separated accepted maturity levels; empty accepts everything
    #[serde(default)]
    pub maturity_levels: String,
}

impl ScanConfig {
    pub fn project_filters(&self) -> ProjectFilters {
        ProjectFilters {
            criticality: self.criticality.clone(),
            environment: self.environment.clone(),
            lifecycle: self.lifecycle.clone(),
        }
    }
}

/// Ticket tracker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Tracker base URL, used for user lookups (e.g. "https://acme.atlassian.net").
    /// Empty means assignee resolution is skipped.
    #[serde(default)]
    pub base_url: String,
    /// Tracker API token
    #[serde(default)]
    pub api_token: String,
    /// Tracker project key new tickets are filed under
    #[serde(default = "default_project_key")]
    pub project_key: String,
    /// Issue type for created tickets
    #[serde(default = "default_issue_type")]
    pub issue_type: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            project_key: default_project_key(),
            issue_type: default_issue_type(),
        }
    }
}

fn default_project_key() -> String {
    "SEC".to_string()
}

fn default_issue_type() -> String {
    "Bug".to_string()
}

/// Repository directory (CMDB) configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// Directory service base URL. Empty disables the directory; tickets
    /// are then created without assignees.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

impl DirectoryConfig {
    pub fn enabled(&self) -> bool {
        !self.base_url.is_empty()
    }
}

/// Run behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// Compute tickets but do not create them
    #[serde(default)]
    pub dry_run: bool,
    /// Directory run-log files are written to
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}
