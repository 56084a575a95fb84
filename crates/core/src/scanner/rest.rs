//! REST client for the scanning platform.
//!
//! Organization and project listings go through the versioned REST API;
//! project details and vulnerability data go through the v1 API, matching
//! what the platform exposes for each resource.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{
    Organization, ProjectFilters, ProjectInfo, ProjectRef, ScanApi, ScanError, VulnRecord,
    Vulnerability,
};

const ORGS_API_VERSION: &str = "2024-08-22";
const PROJECTS_API_VERSION: &str = "2022-07-08~beta";
const PAGE_LIMIT: u32 = 100;

/// HTTP implementation of [`ScanApi`].
pub struct RestScanClient {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl RestScanClient {
    pub fn new(endpoint: &str, api_token: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        }
    }

    fn orgs_url(&self) -> String {
        format!(
            "{}/rest/orgs?version={}&limit={}",
            self.endpoint, ORGS_API_VERSION, PAGE_LIMIT
        )
    }

    fn projects_url(&self, org_id: &str, filters: &ProjectFilters) -> String {
        let mut url = format!(
            "{}/rest/orgs/{}/projects?version={}&status=active&limit={}",
            self.endpoint, org_id, PROJECTS_API_VERSION, PAGE_LIMIT
        );

        if let Some(criticality) = &filters.criticality {
            url.push_str("&businessCriticality=");
            url.push_str(&urlencoding::encode(criticality));
        }
        if let Some(environment) = &filters.environment {
            url.push_str("&environment=");
            url.push_str(&urlencoding::encode(environment));
        }
        if let Some(lifecycle) = &filters.lifecycle {
            url.push_str("&lifecycle=");
            url.push_str(&urlencoding::encode(lifecycle));
        }

        url
    }

    fn project_detail_url(&self, org_id: &str, project_id: &str) -> String {
        format!("{}/v1/org/{}/project/{}", self.endpoint, org_id, project_id)
    }

    fn aggregated_issues_url(&self, org_id: &str, project_id: &str) -> String {
        format!(
            "{}/v1/org/{}/project/{}/aggregated-issues",
            self.endpoint, org_id, project_id
        )
    }

    fn issue_paths_url(&self, org_id: &str, project_id: &str, issue_id: &str) -> String {
        format!(
            "{}/v1/org/{}/project/{}/issue/{}/paths",
            self.endpoint, org_id, project_id, issue_id
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ScanError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("token {}", self.api_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ScanError::ParseError(e.to_string()))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, ScanError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("token {}", self.api_token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScanError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ScanError::ParseError(e.to_string()))
    }

    /// Fetch the dependency paths of one issue, rendered as
    /// "pkg@version > pkg@version" strings.
    async fn fetch_issue_paths(
        &self,
        org_id: &str,
        project_id: &str,
        issue_id: &str,
    ) -> Result<Vec<String>, ScanError> {
        let url = self.issue_paths_url(org_id, project_id, issue_id);
        let response: IssuePathsResponse = self.get_json(&url).await?;

        Ok(response
            .paths
            .into_iter()
            .map(|path| {
                path.iter()
                    .map(|step| format!("{}@{}", step.name, step.version))
                    .collect::<Vec<_>>()
                    .join(" > ")
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ScanApi for RestScanClient {
    async fn list_orgs(&self) -> Result<Vec<Organization>, ScanError> {
        let url = self.orgs_url();
        debug!(url = %url, "Listing organizations");

        let response: RestCollection<RestOrg> = self.get_json(&url).await?;

        Ok(response
            .data
            .into_iter()
            .map(|o| Organization {
                id: o.id,
                name: o.attributes.name,
            })
            .collect())
    }

    async fn list_projects(
        &self,
        org_id: &str,
        filters: &ProjectFilters,
    ) -> Result<Vec<ProjectRef>, ScanError> {
        let url = self.projects_url(org_id, filters);
        debug!(url = %url, "Listing projects");

        let response: RestCollection<RestProject> = self.get_json(&url).await?;

        Ok(response
            .data
            .into_iter()
            .map(|p| ProjectRef { id: p.id })
            .collect())
    }

    async fn get_project_details(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<ProjectInfo, ScanError> {
        let url = self.project_detail_url(org_id, project_id);
        debug!(url = %url, "Fetching project details");

        let detail: ProjectDetailResponse = self.get_json(&url).await?;

        Ok(ProjectInfo {
            id: project_id.to_string(),
            name: detail.name,
            origin: detail.origin,
            branch: detail.branch,
        })
    }

    async fn get_open_vulnerabilities(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<Vec<VulnRecord>, ScanError> {
        let url = self.aggregated_issues_url(org_id, project_id);
        debug!(url = %url, "Fetching aggregated issues");

        let body = json!({
            "includeDescription": false,
            "filters": { "types": ["vuln"], "ignored": false }
        });
        let response: AggregatedIssuesResponse = self.post_json(&url, body).await?;

        let mut records = Vec::new();
        for issue in response.issues {
            let base = Vulnerability {
                issue_id: issue.id.clone(),
                path: String::new(),
                title: issue.issue_data.title,
                severity: issue.issue_data.severity,
                maturity: issue.issue_data.exploit_maturity.unwrap_or_default(),
                package_name: issue.pkg_name,
                package_version: issue.pkg_versions.into_iter().next().unwrap_or_default(),
            };

            match self.fetch_issue_paths(org_id, project_id, &issue.id).await {
                Ok(paths) if !paths.is_empty() => {
                    for path in paths {
                        records.push(VulnRecord::Resolved(Vulnerability {
                            path,
                            ..base.clone()
                        }));
                    }
                }
                Ok(_) => {
                    // No path data for an open issue means the upstream
                    // record is incomplete.
                    warn!(issue_id = %issue.id, "Issue has no dependency paths");
                    records.push(VulnRecord::Unresolved(base));
                }
                Err(e) => {
                    warn!(issue_id = %issue.id, error = %e, "Could not fetch issue paths");
                    records.push(VulnRecord::Unresolved(base));
                }
            }
        }

        Ok(records)
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct RestCollection<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RestOrg {
    id: String,
    attributes: RestOrgAttributes,
}

#[derive(Debug, Deserialize)]
struct RestOrgAttributes {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RestProject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDetailResponse {
    name: String,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggregatedIssuesResponse {
    issues: Vec<AggregatedIssue>,
}

#[derive(Debug, Deserialize)]
struct AggregatedIssue {
    id: String,
    #[serde(rename = "pkgName")]
    pkg_name: String,
    #[serde(rename = "pkgVersions", default)]
    pkg_versions: Vec<String>,
    #[serde(rename = "issueData")]
    issue_data: AggregatedIssueData,
}

#[derive(Debug, Deserialize)]
struct AggregatedIssueData {
    title: String,
    severity: String,
    #[serde(rename = "exploitMaturity", default)]
    exploit_maturity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssuePathsResponse {
    #[serde(default)]
    paths: Vec<Vec<PathStep>>,
}

#[derive(Debug, Deserialize)]
struct PathStep {
    name: String,
    version: String,
}
