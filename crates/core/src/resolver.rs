//! Organization and project resolution.
//!
//! Decides which organizations and projects a run covers: either the ids
//! pinned in configuration, or the intersection of the configured
//! organization catalog with the remote listing plus a filtered project
//! listing per organization.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::scanner::{ProjectFilters, ScanApi, ScanError};

/// Display name used when an organization id is pinned and no remote
/// lookup is made for it.
pub const PINNED_ORG_NAME: &str = "unknown";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Could not find any organizations: {0}")]
    NoOrganizations(String),

    #[error("No projects matched for org {org_id} ({filters})")]
    EmptyProjectList { org_id: String, filters: String },

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Resolve the organizations to process, as display name -> org id.
///
/// A pinned org id is used verbatim under a placeholder name, without
/// consulting the remote catalog. Otherwise the injected name->id catalog
/// is intersected with the remote listing by id; an empty intersection
/// fails the run.
pub async fn resolve_orgs(
    scanner: &dyn ScanApi,
    catalog: &BTreeMap<String, String>,
    pinned_org: Option<&str>,
) -> Result<BTreeMap<String, String>, ResolveError> {
    if let Some(org_id) = pinned_org {
        debug!(org_id = %org_id, "Using pinned organization id");
        let mut orgs = BTreeMap::new();
        orgs.insert(PINNED_ORG_NAME.to_string(), org_id.to_string());
        return Ok(orgs);
    }

    let remote = scanner.list_orgs().await?;
    if remote.is_empty() {
        return Err(ResolveError::NoOrganizations(
            "remote organization listing is empty".to_string(),
        ));
    }

    let mut orgs = BTreeMap::new();
    for id in catalog.values() {
        if let Some(org) = remote.iter().find(|o| o.id == *id) {
            info!(name = %org.name, id = %org.id, "Found organization");
            orgs.insert(org.name.clone(), org.id.clone());
        }
    }

    if orgs.is_empty() {
        return Err(ResolveError::NoOrganizations(
            "no configured organization matched the remote listing".to_string(),
        ));
    }

    Ok(orgs)
}

/// Resolve the project ids to process for one organization.
///
/// A pinned project id is returned alone with no remote call. Otherwise
/// the active projects matching the configured allow-lists are listed;
/// an empty listing fails resolution for this organization.
pub async fn resolve_projects(
    scanner: &dyn ScanApi,
    org_id: &str,
    pinned_project: Option<&str>,
    filters: &ProjectFilters,
) -> Result<Vec<String>, ResolveError> {
    if let Some(project_id) = pinned_project {
        debug!(project_id = %project_id, "Using pinned project id");
        return Ok(vec![project_id.to_string()]);
    }

    info!(
        org_id = %org_id,
        filters = %filters.describe(),
        "Project id not specified, listing matching projects"
    );

    let projects = scanner.list_projects(org_id, filters).await?;
    if projects.is_empty() {
        return Err(ResolveError::EmptyProjectList {
            org_id: org_id.to_string(),
            filters: filters.describe(),
        });
    }

    Ok(projects.into_iter().map(|p| p.id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Organization;
    use crate::testing::MockScanClient;

    fn catalog(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_pinned_org_skips_remote_listing() {
        // The mock returns no orgs at all; a pinned id must still resolve.
        let scanner = MockScanClient::new();
        let orgs = resolve_orgs(&scanner, &catalog(&[]), Some("org-42"))
            .await
            .unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[PINNED_ORG_NAME], "org-42");
        assert!(scanner.list_orgs_calls().await == 0);
    }

    #[tokio::test]
    async fn test_resolve_orgs_intersects_catalog() {
        let scanner = MockScanClient::new();
        scanner
            .set_orgs(vec![
                Organization {
                    id: "org-1".to_string(),
                    name: "Billing".to_string(),
                },
                Organization {
                    id: "org-3".to_string(),
                    name: "Platform".to_string(),
                },
            ])
            .await;

        let catalog = catalog(&[("Billing", "org-1"), ("Nova", "org-2")]);
        let orgs = resolve_orgs(&scanner, &catalog, None).await.unwrap();

        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs["Billing"], "org-1");
    }

    #[tokio::test]
    async fn test_resolve_orgs_empty_intersection_fails() {
        let scanner = MockScanClient::new();
        scanner
            .set_orgs(vec![Organization {
                id: "org-9".to_string(),
                name: "Other".to_string(),
            }])
            .await;

        let result = resolve_orgs(&scanner, &catalog(&[("Billing", "org-1")]), None).await;
        assert!(matches!(result, Err(ResolveError::NoOrganizations(_))));
    }

    #[tokio::test]
    async fn test_resolve_orgs_empty_remote_listing_fails() {
        let scanner = MockScanClient::new();
        let result = resolve_orgs(&scanner, &catalog(&[("Billing", "org-1")]), None).await;
        assert!(matches!(result, Err(ResolveError::NoOrganizations(_))));
    }

    #[tokio::test]
    async fn test_pinned_project_returned_without_remote_call() {
        let scanner = MockScanClient::new();
        let projects =
            resolve_projects(&scanner, "org-1", Some("proj-7"), &ProjectFilters::default())
                .await
                .unwrap();
        assert_eq!(projects, vec!["proj-7".to_string()]);
        assert!(scanner.recorded_project_filters().await.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_projects_passes_filters_through() {
        let scanner = MockScanClient::new();
        scanner.set_projects("org-1", &["p1", "p2"]).await;

        let filters = ProjectFilters {
            criticality: Some("critical,high".to_string()),
            environment: None,
            lifecycle: Some("production".to_string()),
        };
        let projects = resolve_projects(&scanner, "org-1", None, &filters)
            .await
            .unwrap();

        assert_eq!(projects, vec!["p1".to_string(), "p2".to_string()]);
        let recorded = scanner.recorded_project_filters().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], filters);
    }

    #[tokio::test]
    async fn test_resolve_projects_empty_listing_fails() {
        let scanner = MockScanClient::new();
        scanner.set_projects("org-1", &[]).await;

        let result =
            resolve_projects(&scanner, "org-1", None, &ProjectFilters::default()).await;
        assert!(matches!(
            result,
            Err(ResolveError::EmptyProjectList { .. })
        ));
    }
}
