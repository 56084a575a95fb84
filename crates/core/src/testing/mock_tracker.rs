//! Mock issue tracker client.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use crate::tracker::{CreatedTicket, ExistingTicket, TicketSpec, TrackerApi, TrackerError};

/// Mock implementation of [`TrackerApi`].
///
/// Records every creation and user lookup; creations can be failed per
/// issue id or wholesale.
#[derive(Default)]
pub struct MockTracker {
    existing: Arc<RwLock<HashMap<String, Vec<ExistingTicket>>>>,
    fail_listing_for: Arc<RwLock<HashSet<String>>>,
    created: Arc<RwLock<Vec<TicketSpec>>>,
    fail_issue_ids: Arc<RwLock<HashSet<String>>>,
    fail_all_creations: Arc<RwLock<bool>>,
    user_ids: Arc<RwLock<HashMap<String, String>>>,
    resolve_calls: Arc<RwLock<Vec<String>>>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_existing(&self, project_id: &str, tickets: Vec<ExistingTicket>) {
        self.existing
            .write()
            .await
            .insert(project_id.to_string(), tickets);
    }

    pub async fn fail_listing_for(&self, project_id: &str) {
        self.fail_listing_for
            .write()
            .await
            .insert(project_id.to_string());
    }

    pub async fn created_specs(&self) -> Vec<TicketSpec> {
        self.created.read().await.clone()
    }

    pub async fn fail_creation_for(&self, issue_id: &str) {
        self.fail_issue_ids
            .write()
            .await
            .insert(issue_id.to_string());
    }

    pub async fn fail_all_creations(&self) {
        *self.fail_all_creations.write().await = true;
    }

    pub async fn set_user_id(&self, manager: &str, user_id: &str) {
        self.user_ids
            .write()
            .await
            .insert(manager.to_string(), user_id.to_string());
    }

    pub async fn resolve_calls(&self) -> Vec<String> {
        self.resolve_calls.read().await.clone()
    }
}

#[async_trait]
impl TrackerApi for MockTracker {
    async fn list_existing_tickets(
        &self,
        _org_id: &str,
        project_id: &str,
    ) -> Result<Vec<ExistingTicket>, TrackerError> {
        if self.fail_listing_for.read().await.contains(project_id) {
            return Err(TrackerError::ConnectionFailed("mock failure".to_string()));
        }
        Ok(self
            .existing
            .read()
            .await
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_ticket(&self, spec: &TicketSpec) -> Result<CreatedTicket, TrackerError> {
        if *self.fail_all_creations.read().await
            || self.fail_issue_ids.read().await.contains(&spec.issue_id)
        {
            return Err(TrackerError::ApiError {
                status: 500,
                message: "mock creation failure".to_string(),
            });
        }

        let mut created = self.created.write().await;
        created.push(spec.clone());
        let key = format!("{}-{}", spec.project_key, created.len());

        Ok(CreatedTicket {
            raw: json!({ "jiraIssue": { "key": key } }),
            key,
        })
    }

    async fn resolve_user_id(&self, manager: &str) -> Result<String, TrackerError> {
        self.resolve_calls.write().await.push(manager.to_string());
        self.user_ids
            .read()
            .await
            .get(manager)
            .cloned()
            .ok_or_else(|| TrackerError::UserNotFound(manager.to_string()))
    }
}
