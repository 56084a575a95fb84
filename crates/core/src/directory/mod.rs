//! Repository directory (CMDB) abstraction.
//!
//! Maps repository names to their owning manager and, after enrichment, the
//! manager's tracker user id used for ticket assignment.

mod rest;

pub use rest::RestDirectoryClient;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::tracker::TrackerApi;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DirectoryError::Timeout
        } else if e.is_connect() {
            DirectoryError::ConnectionFailed(e.to_string())
        } else {
            DirectoryError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// One directory entry: the manager of a repository, plus the manager's
/// tracker user id once resolved (empty until enrichment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoRecord {
    pub manager: String,
    pub tracker_user_id: String,
}

/// Repository name -> record, loaded once at process start.
pub type RepoDirectory = HashMap<String, RepoRecord>;

/// Source of the repository directory.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn load_all(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<RepoDirectory, DirectoryError>;
}

/// Bounded manager -> tracker-user-id cache, scoped to one run.
///
/// At capacity lookups keep working and new entries are dropped; a one-shot
/// run never benefits from eviction.
#[derive(Debug)]
pub struct ManagerIdCache {
    max_entries: usize,
    entries: HashMap<String, String>,
}

impl Default for ManagerIdCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl ManagerIdCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, manager: &str) -> Option<&str> {
        self.entries.get(manager).map(String::as_str)
    }

    pub fn insert(&mut self, manager: &str, user_id: &str) {
        if self.entries.len() < self.max_entries || self.entries.contains_key(manager) {
            self.entries.insert(manager.to_string(), user_id.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the tracker user id of every manager in the directory, in place.
///
/// Unknown managers are logged and left with an empty id; they never block
/// ticket creation, the ticket is simply created unassigned.
pub async fn enrich_directory(
    directory: &mut RepoDirectory,
    tracker: &dyn TrackerApi,
    cache: &mut ManagerIdCache,
) {
    for (repo, record) in directory.iter_mut() {
        if let Some(user_id) = cache.get(&record.manager) {
            record.tracker_user_id = user_id.to_string();
            continue;
        }

        match tracker.resolve_user_id(&record.manager).await {
            Ok(user_id) => {
                debug!(repo = %repo, manager = %record.manager, "Resolved tracker user id");
                cache.insert(&record.manager, &user_id);
                record.tracker_user_id = user_id;
            }
            Err(e) => {
                warn!(
                    repo = %repo,
                    manager = %record.manager,
                    error = %e,
                    "Could not resolve tracker user id for manager"
                );
                // Cache the miss too, one lookup per manager is enough.
                cache.insert(&record.manager, "");
            }
        }
    }
}
