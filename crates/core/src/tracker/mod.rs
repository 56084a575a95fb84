//! Issue tracker abstraction.
//!
//! `TrackerApi` covers what the pipeline needs from the ticketing side:
//! listing the tickets that already exist for a project, creating new ones,
//! and resolving a manager to a tracker user id for assignment.

mod jira;
mod types;

pub use jira::JiraTracker;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Unknown tracker user: {0}")]
    UserNotFound(String),

    #[error("Tracker not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for TrackerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TrackerError::Timeout
        } else if e.is_connect() {
            TrackerError::ConnectionFailed(e.to_string())
        } else {
            TrackerError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// Client for the issue tracker.
#[async_trait]
pub trait TrackerApi: Send + Sync {
    /// List the tickets already tracked for a project's vulnerabilities.
    async fn list_existing_tickets(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<Vec<ExistingTicket>, TrackerError>;

    /// Create one ticket. Returns the ticket key and the raw response
    /// metadata for the run log.
    async fn create_ticket(&self, spec: &TicketSpec) -> Result<CreatedTicket, TrackerError>;

    /// Resolve a manager identifier to a tracker user id.
    async fn resolve_user_id(&self, manager: &str) -> Result<String, TrackerError>;
}
