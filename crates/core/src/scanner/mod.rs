//! Scan platform abstraction.
//!
//! The `ScanApi` trait covers the four calls the reconciliation pipeline
//! needs from the scanning platform; `RestScanClient` is the HTTP
//! implementation.

mod rest;
mod types;

pub use rest::RestScanClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for ScanError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScanError::Timeout
        } else if e.is_connect() {
            ScanError::ConnectionFailed(e.to_string())
        } else {
            ScanError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// Client for the security-scanning platform.
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// List every organization visible to the configured token.
    async fn list_orgs(&self) -> Result<Vec<Organization>, ScanError>;

    /// List active projects of an organization, optionally constrained by
    /// criticality/environment/lifecycle allow-lists.
    async fn list_projects(
        &self,
        org_id: &str,
        filters: &ProjectFilters,
    ) -> Result<Vec<ProjectRef>, ScanError>;

    /// Fetch display details for one project.
    async fn get_project_details(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<ProjectInfo, ScanError>;

    /// Fetch the open vulnerabilities of a project. A vulnerability whose
    /// detail cannot be retrieved is returned as `VulnRecord::Unresolved`
    /// rather than failing the whole listing.
    async fn get_open_vulnerabilities(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<Vec<VulnRecord>, ScanError>;
}
