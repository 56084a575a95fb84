//! Ticket creation.
//!
//! Takes the delta set of one project and drives ticket creation against the
//! tracker, accumulating successes, per-issue failures, and the log entries
//! that end up in the consolidated run log. In dry-run mode nothing is
//! created; the would-be tickets are still logged.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::directory::RepoDirectory;
use crate::scanner::{ProjectInfo, Vulnerability};
use crate::tracker::{TicketSpec, TrackerApi};

/// Outcome of opening tickets for one project.
#[derive(Debug, Default)]
pub struct TicketCreationResult {
    pub created_count: usize,
    /// Concatenated raw bodies of successful creations. Empty in dry-run
    /// mode; empty in normal mode signals total failure for the project.
    pub raw_response: String,
    /// Issue ids for which creation failed.
    pub not_created: Vec<String>,
    /// Run-log entries contributed by this project, keyed by ticket key
    /// (created) or a stable project/issue/path key (dry run).
    pub project_log: BTreeMap<String, Value>,
}

/// Creates tickets for a project's delta set.
pub struct TicketOpener {
    tracker: Arc<dyn TrackerApi>,
    project_key: String,
    issue_type: String,
    dry_run: bool,
}

impl TicketOpener {
    pub fn new(tracker: Arc<dyn TrackerApi>, config: &TrackerConfig, dry_run: bool) -> Self {
        Self {
            tracker,
            project_key: config.project_key.clone(),
            issue_type: config.issue_type.clone(),
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn open_tickets(
        &self,
        org_id: &str,
        project: &ProjectInfo,
        vulns_per_path: &BTreeMap<String, Vec<Vulnerability>>,
        directory: &RepoDirectory,
    ) -> TicketCreationResult {
        let assignee_id = assignee_for(project, directory);
        let mut result = TicketCreationResult::default();

        for (path, vulns) in vulns_per_path {
            for vuln in vulns {
                let spec = TicketSpec {
                    org_id: org_id.to_string(),
                    project_id: project.id.clone(),
                    issue_id: vuln.issue_id.clone(),
                    summary: summary_for(vuln),
                    description: description_for(project, vuln),
                    project_key: self.project_key.clone(),
                    issue_type: self.issue_type.clone(),
                    assignee_id: assignee_id.clone(),
                };

                if self.dry_run {
                    let key = format!("{}:{}:{}", project.id, vuln.issue_id, path);
                    result.project_log.insert(key, dry_run_entry(&spec, path));
                    continue;
                }

                match self.tracker.create_ticket(&spec).await {
                    Ok(ticket) => {
                        debug!(key = %ticket.key, issue_id = %vuln.issue_id, "Ticket created");
                        result.created_count += 1;
                        result
                            .raw_response
                            .push_str(&ticket.raw.to_string());
                        result.raw_response.push('\n');
                        result
                            .project_log
                            .insert(ticket.key.clone(), created_entry(&spec, path, &ticket.raw));
                    }
                    Err(e) => {
                        warn!(
                            issue_id = %vuln.issue_id,
                            path = %path,
                            error = %e,
                            "Could not create ticket"
                        );
                        result.not_created.push(vuln.issue_id.clone());
                    }
                }
            }
        }

        result
    }
}

/// Tracker user id for the project's repository, if the directory knows one.
/// A missing repo or an unresolved manager leaves the ticket unassigned.
fn assignee_for(project: &ProjectInfo, directory: &RepoDirectory) -> Option<String> {
    directory
        .get(project.repo_name())
        .filter(|record| !record.tracker_user_id.is_empty())
        .map(|record| record.tracker_user_id.clone())
}

fn summary_for(vuln: &Vulnerability) -> String {
    format!(
        "[{}] {} in {}@{}",
        vuln.severity, vuln.title, vuln.package_name, vuln.package_version
    )
}

fn description_for(project: &ProjectInfo, vuln: &Vulnerability) -> String {
    format!(
        "Issue: {}\nProject: {}\nDependency path: {}\nExploit maturity: {}",
        vuln.issue_id, project.name, vuln.path, vuln.maturity
    )
}

fn created_entry(spec: &TicketSpec, path: &str, raw: &Value) -> Value {
    json!({
        "status": "created",
        "issueId": spec.issue_id,
        "projectId": spec.project_id,
        "path": path,
        "summary": spec.summary,
        "assignee": spec.assignee_id,
        "response": raw,
    })
}

fn dry_run_entry(spec: &TicketSpec, path: &str) -> Value {
    json!({
        "status": "dry-run",
        "issueId": spec.issue_id,
        "projectId": spec.project_id,
        "path": path,
        "summary": spec.summary,
        "assignee": spec.assignee_id,
    })
}
