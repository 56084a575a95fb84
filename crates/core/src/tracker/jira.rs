//! Jira implementation of the tracker client.
//!
//! Listing and creation go through the scan platform's tracker-bridge
//! endpoints (the platform records which issues it has filed tickets for);
//! user resolution goes to the tracker itself.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::TrackerConfig;

use super::{CreatedTicket, ExistingTicket, TicketSpec, TrackerApi, TrackerError};

/// Jira-backed [`TrackerApi`].
pub struct JiraTracker {
    client: Client,
    scan_endpoint: String,
    scan_token: String,
    base_url: String,
    api_token: String,
}

impl JiraTracker {
    pub fn new(scan_endpoint: &str, scan_token: &str, config: &TrackerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            scan_endpoint: scan_endpoint.trim_end_matches('/').to_string(),
            scan_token: scan_token.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn existing_tickets_url(&self, org_id: &str, project_id: &str) -> String {
        format!(
            "{}/v1/org/{}/project/{}/jira-issues",
            self.scan_endpoint, org_id, project_id
        )
    }

    fn create_ticket_url(&self, spec: &TicketSpec) -> String {
        format!(
            "{}/v1/org/{}/project/{}/issue/{}/jira-issue",
            self.scan_endpoint, spec.org_id, spec.project_id, spec.issue_id
        )
    }

    fn user_search_url(&self, manager: &str) -> String {
        format!(
            "{}/rest/api/2/user/search?query={}",
            self.base_url,
            urlencoding::encode(manager)
        )
    }
}

#[async_trait::async_trait]
impl TrackerApi for JiraTracker {
    async fn list_existing_tickets(
        &self,
        org_id: &str,
        project_id: &str,
    ) -> Result<Vec<ExistingTicket>, TrackerError> {
        let url = self.existing_tickets_url(org_id, project_id);
        debug!(url = %url, "Listing existing tickets");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", self.scan_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let listing: ExistingTicketsResponse = response
            .json()
            .await
            .map_err(|e| TrackerError::ParseError(e.to_string()))?;

        let mut tickets = Vec::new();
        for (issue_id, entries) in listing.0 {
            for entry in entries {
                tickets.push(ExistingTicket {
                    key: entry.jira_issue.key,
                    issue_id: issue_id.clone(),
                    path: entry.path,
                });
            }
        }

        Ok(tickets)
    }

    async fn create_ticket(&self, spec: &TicketSpec) -> Result<CreatedTicket, TrackerError> {
        let url = self.create_ticket_url(spec);
        debug!(url = %url, issue_id = %spec.issue_id, "Creating ticket");

        let mut fields = json!({
            "project": { "key": spec.project_key },
            "issuetype": { "name": spec.issue_type },
            "summary": spec.summary,
            "description": spec.description,
        });
        if let Some(assignee) = &spec.assignee_id {
            fields["assignee"] = json!({ "accountId": assignee });
        }

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {}", self.scan_token))
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TrackerError::ParseError(e.to_string()))?;

        let key = raw
            .pointer("/jiraIssue/key")
            .and_then(|k| k.as_str())
            .ok_or_else(|| {
                TrackerError::ParseError("Creation response has no ticket key".to_string())
            })?
            .to_string();

        Ok(CreatedTicket { key, raw })
    }

    async fn resolve_user_id(&self, manager: &str) -> Result<String, TrackerError> {
        if self.base_url.is_empty() {
            return Err(TrackerError::NotConfigured(
                "tracker.base_url is not set".to_string(),
            ));
        }

        let url = self.user_search_url(manager);
        debug!(url = %url, "Resolving tracker user id");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let users: Vec<TrackerUser> = response
            .json()
            .await
            .map_err(|e| TrackerError::ParseError(e.to_string()))?;

        users
            .into_iter()
            .next()
            .map(|u| u.account_id)
            .ok_or_else(|| TrackerError::UserNotFound(manager.to_string()))
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct ExistingTicketsResponse(std::collections::HashMap<String, Vec<ExistingTicketEntry>>);

#[derive(Debug, Deserialize)]
struct ExistingTicketEntry {
    #[serde(rename = "jiraIssue")]
    jira_issue: JiraIssueRef,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JiraIssueRef {
    key: String,
}

#[derive(Debug, Deserialize)]
struct TrackerUser {
    #[serde(rename = "accountId")]
    account_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> JiraTracker {
        JiraTracker::new(
            "https://api.example.io/",
            "scan-tok",
            &TrackerConfig {
                base_url: "https://acme.atlassian.net/".to_string(),
                api_token: "jira-tok".to_string(),
                project_key: "SEC".to_string(),
                issue_type: "Bug".to_string(),
            },
        )
    }

    #[test]
    fn test_existing_tickets_url() {
        assert_eq!(
            tracker().existing_tickets_url("o", "p"),
            "https://api.example.io/v1/org/o/project/p/jira-issues"
        );
    }

    #[test]
    fn test_create_ticket_url() {
        let spec = TicketSpec {
            org_id: "o".to_string(),
            project_id: "p".to_string(),
            issue_id: "i".to_string(),
            summary: "s".to_string(),
            description: "d".to_string(),
            project_key: "SEC".to_string(),
            issue_type: "Bug".to_string(),
            assignee_id: None,
        };
        assert_eq!(
            tracker().create_ticket_url(&spec),
            "https://api.example.io/v1/org/o/project/p/issue/i/jira-issue"
        );
    }

    #[test]
    fn test_user_search_url_encodes_query() {
        assert_eq!(
            tracker().user_search_url("jane doe"),
            "https://acme.atlassian.net/rest/api/2/user/search?query=jane%20doe"
        );
    }

    #[test]
    fn test_parse_existing_tickets_listing() {
        let body = r#"{
            "SNYK-JS-LODASH-567746": [
                { "jiraIssue": { "id": "10001", "key": "SEC-42" } }
            ]
        }"#;
        let parsed: ExistingTicketsResponse = serde_json::from_str(body).unwrap();
        let entries = &parsed.0["SNYK-JS-LODASH-567746"];
        assert_eq!(entries[0].jira_issue.key, "SEC-42");
        assert!(entries[0].path.is_none());
    }
}
