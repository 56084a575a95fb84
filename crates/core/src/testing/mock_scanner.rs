//! Mock scan platform client.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::scanner::{
    Organization, ProjectFilters, ProjectInfo, ProjectRef, ScanApi, ScanError, VulnRecord,
};

/// Mock implementation of [`ScanApi`].
///
/// Results are configured per project id; unconfigured lookups fail the way
/// the real client fails on a 404.
#[derive(Default)]
pub struct MockScanClient {
    orgs: Arc<RwLock<Vec<Organization>>>,
    list_orgs_calls: Arc<RwLock<usize>>,
    projects: Arc<RwLock<HashMap<String, Vec<ProjectRef>>>>,
    recorded_filters: Arc<RwLock<Vec<ProjectFilters>>>,
    details: Arc<RwLock<HashMap<String, ProjectInfo>>>,
    vulns: Arc<RwLock<HashMap<String, Vec<VulnRecord>>>>,
    fail_details_for: Arc<RwLock<HashSet<String>>>,
    fail_vulns_for: Arc<RwLock<HashSet<String>>>,
    fail_org_listing: Arc<RwLock<bool>>,
}

impl MockScanClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_orgs(&self, orgs: Vec<Organization>) {
        *self.orgs.write().await = orgs;
    }

    pub async fn fail_org_listing(&self) {
        *self.fail_org_listing.write().await = true;
    }

    pub async fn list_orgs_calls(&self) -> usize {
        *self.list_orgs_calls.read().await
    }

    pub async fn set_projects(&self, org_id: &str, project_ids: &[&str]) {
        self.projects.write().await.insert(
            org_id.to_string(),
            project_ids
                .iter()
                .map(|id| ProjectRef { id: id.to_string() })
                .collect(),
        );
    }

    pub async fn recorded_project_filters(&self) -> Vec<ProjectFilters> {
        self.recorded_filters.read().await.clone()
    }

    pub async fn set_details(&self, project: ProjectInfo) {
        self.details
            .write()
            .await
            .insert(project.id.clone(), project);
    }

    pub async fn fail_details_for(&self, project_id: &str) {
        self.fail_details_for
            .write()
            .await
            .insert(project_id.to_string());
    }

    pub async fn set_vulns(&self, project_id: &str, records: Vec<VulnRecord>) {
        self.vulns
            .write()
            .await
            .insert(project_id.to_string(), records);
    }

    pub async fn fail_vulns_for(&self, project_id: &str) {
        self.fail_vulns_for
            .write()
            .await
            .insert(project_id.to_string());
    }
}

fn not_found(what: &str) -> ScanError {
    ScanError::ApiError {
        status: 404,
        message: format!("{} not found", what),
    }
}

#[async_trait]
impl ScanApi for MockScanClient {
    async fn list_orgs(&self) -> Result<Vec<Organization>, ScanError> {
        *self.list_orgs_calls.write().await += 1;
        if *self.fail_org_listing.read().await {
            return Err(ScanError::ConnectionFailed("mock failure".to_string()));
        }
        Ok(self.orgs.read().await.clone())
    }

    async fn list_projects(
        &self,
        org_id: &str,
        filters: &ProjectFilters,
    ) -> Result<Vec<ProjectRef>, ScanError> {
        self.recorded_filters.write().await.push(filters.clone());
        Ok(self
            .projects
            .read()
            .await
            .get(org_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_project_details(
        &self,
        _org_id: &str,
        project_id: &str,
    ) -> Result<ProjectInfo, ScanError> {
        if self.fail_details_for.read().await.contains(project_id) {
            return Err(ScanError::ConnectionFailed("mock failure".to_string()));
        }
        self.details
            .read()
            .await
            .get(project_id)
            .cloned()
            .ok_or_else(|| not_found("project"))
    }

    async fn get_open_vulnerabilities(
        &self,
        _org_id: &str,
        project_id: &str,
    ) -> Result<Vec<VulnRecord>, ScanError> {
        if self.fail_vulns_for.read().await.contains(project_id) {
            return Err(ScanError::ConnectionFailed("mock failure".to_string()));
        }
        self.vulns
            .read()
            .await
            .get(project_id)
            .cloned()
            .ok_or_else(|| not_found("vulnerabilities"))
    }
}
