//! Per-organization, per-project reconciliation loop.
//!
//! Each project goes through four ordered steps: fetch details, fetch
//! existing tickets, compute the delta, open tickets. Every step fails in
//! isolation: the failure is logged, the project is skipped, and the loop
//! moves on. One project can never abort the organization or the run.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::delta::compute_delta;
use crate::directory::RepoDirectory;
use crate::logfile::{LogError, LogSink};
use crate::maturity::MaturityFilter;
use crate::opener::TicketOpener;
use crate::resolver::resolve_projects;
use crate::scanner::{ProjectFilters, ScanApi};
use crate::tracker::TrackerApi;

use super::run_log::RunLog;

/// Prefix of the consolidated run-log file.
const RUN_LOG_PREFIX: &str = "listOfTicketCreated_";
/// Prefix of the per-step error file.
const ERROR_LOG_PREFIX: &str = "ErrorsFile_";

/// The step a project failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ProjectDetails,
    ExistingTickets,
    Vulnerabilities,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ProjectDetails => "project-details",
            Step::ExistingTickets => "existing-tickets",
            Step::Vulnerabilities => "vulnerabilities",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Outcome of one fully processed project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// The delta was empty.
    NoTicketsRequired,
    /// Dry-run mode: tickets computed but not created.
    DryRun { would_create: usize },
    /// Tickets were created; `not_created` holds the issue ids that failed.
    Created {
        created: usize,
        not_created: Vec<String>,
    },
    /// Non-dry-run with an empty raw response: nothing was created.
    TotalFailure { not_created: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct ProjectReport {
    pub org_name: String,
    pub project_id: String,
    pub outcome: ProjectOutcome,
}

/// A project abandoned at one of the four steps.
#[derive(Debug, Clone)]
pub struct SkippedProject {
    pub org_name: String,
    pub project_id: String,
    pub step: &'static str,
}

/// What a run did, for the human-readable summary.
#[derive(Debug)]
pub struct RunSummary {
    pub reports: Vec<ProjectReport>,
    pub skipped: Vec<SkippedProject>,
    pub log_path: PathBuf,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn processed_count(&self) -> usize {
        self.reports.len()
    }
}

struct StepFailure {
    step: Step,
    message: String,
}

/// Drives the reconciliation run and owns the run log for its lifetime.
pub struct RunReporter {
    scanner: Arc<dyn ScanApi>,
    tracker: Arc<dyn TrackerApi>,
    sink: Arc<dyn LogSink>,
    opener: TicketOpener,
    filter: MaturityFilter,
    project_filters: ProjectFilters,
    pinned_project: Option<String>,
    dry_run: bool,
    log: RunLog,
}

impl RunReporter {
    pub fn new(
        scanner: Arc<dyn ScanApi>,
        tracker: Arc<dyn TrackerApi>,
        sink: Arc<dyn LogSink>,
        config: &Config,
    ) -> Self {
        let opener = TicketOpener::new(
            Arc::clone(&tracker),
            &config.tracker,
            config.run.dry_run,
        );

        Self {
            scanner,
            tracker,
            sink,
            opener,
            filter: MaturityFilter::from_spec(&config.scan.maturity_levels),
            project_filters: config.scan.project_filters(),
            pinned_project: config.scan.project_id.clone(),
            dry_run: config.run.dry_run,
            log: RunLog::default(),
        }
    }

    /// Process every organization and write the run log once at the end.
    pub async fn run(
        mut self,
        orgs: &BTreeMap<String, String>,
        directory: &RepoDirectory,
    ) -> Result<RunSummary, ReportError> {
        let log_path = self.sink.create_run_file(RUN_LOG_PREFIX)?;
        let error_path = self.sink.create_run_file(ERROR_LOG_PREFIX)?;

        let mut reports = Vec::new();
        let mut skipped = Vec::new();

        for (org_name, org_id) in orgs {
            info!(org = %org_name, "Reporting issues for organization");

            let project_ids = match resolve_projects(
                self.scanner.as_ref(),
                org_id,
                self.pinned_project.as_deref(),
                &self.project_filters,
            )
            .await
            {
                Ok(ids) => ids,
                Err(e) => {
                    // Aborts only this organization.
                    error!(org = %org_name, error = %e, "Could not resolve projects");
                    self.record_error(&error_path, "resolve-projects", &e.to_string());
                    continue;
                }
            };

            for project_id in project_ids {
                match self
                    .process_project(org_name, org_id, &project_id, directory)
                    .await
                {
                    Ok(outcome) => reports.push(ProjectReport {
                        org_name: org_name.clone(),
                        project_id,
                        outcome,
                    }),
                    Err(failure) => {
                        warn!(
                            project = %project_id,
                            step = failure.step.as_str(),
                            error = %failure.message,
                            "Skipping project"
                        );
                        self.record_error(
                            &error_path,
                            failure.step.as_str(),
                            &format!("project {}: {}", project_id, failure.message),
                        );
                        skipped.push(SkippedProject {
                            org_name: org_name.clone(),
                            project_id,
                            step: failure.step.as_str(),
                        });
                    }
                }
            }
        }

        self.sink.write(&self.log, &log_path)?;

        Ok(RunSummary {
            reports,
            skipped,
            log_path,
            dry_run: self.dry_run,
        })
    }

    async fn process_project(
        &mut self,
        org_name: &str,
        org_id: &str,
        project_id: &str,
        directory: &RepoDirectory,
    ) -> Result<ProjectOutcome, StepFailure> {
        info!(project = %project_id, "Step 1/4 - Retrieving project");
        let project = self
            .scanner
            .get_project_details(org_id, project_id)
            .await
            .map_err(|e| StepFailure {
                step: Step::ProjectDetails,
                message: e.to_string(),
            })?;

        info!(project = %project_id, "Step 2/4 - Retrieving existing tickets");
        let tickets = self
            .tracker
            .list_existing_tickets(org_id, project_id)
            .await
            .map_err(|e| StepFailure {
                step: Step::ExistingTickets,
                message: e.to_string(),
            })?;
        debug!(project = %project_id, tickets = tickets.len(), "Existing tickets");

        info!(project = %project_id, "Step 3/4 - Getting vulnerabilities");
        let records = self
            .scanner
            .get_open_vulnerabilities(org_id, project_id)
            .await
            .map_err(|e| StepFailure {
                step: Step::Vulnerabilities,
                message: e.to_string(),
            })?;

        let delta = compute_delta(&records, &tickets, &self.filter);
        debug!(
            project = %project_id,
            delta = delta.vuln_count(),
            skipped = delta.skipped.len(),
            "Delta computed"
        );
        if !delta.skipped.is_empty() {
            // These could not be evaluated because the platform did not
            // return usable detail for them.
            debug!(
                project = %project_id,
                issues = ?delta.skipped.iter().map(|v| v.issue_id.as_str()).collect::<Vec<_>>(),
                "Skipped vulnerabilities"
            );
        }

        if delta.is_empty() {
            info!(project = %project_id, "Step 4/4 - No new ticket required");
            return Ok(ProjectOutcome::NoTicketsRequired);
        }

        info!(project = %project_id, org = %org_name, "Step 4/4 - Opening tickets");
        let would_create = delta.vuln_count();
        let result = self
            .opener
            .open_tickets(org_id, &project, &delta.vulns_per_path, directory)
            .await;

        if !result.project_log.is_empty() {
            self.log.merge_project_log(result.project_log);
        }

        if self.dry_run {
            return Ok(ProjectOutcome::DryRun { would_create });
        }

        if result.raw_response.is_empty() {
            // Operator-visible, but the project still counts as processed.
            error!(project = %project_id, "Failed to create ticket(s)");
            return Ok(ProjectOutcome::TotalFailure {
                not_created: result.not_created,
            });
        }

        Ok(ProjectOutcome::Created {
            created: result.created_count,
            not_created: result.not_created,
        })
    }

    fn record_error(&self, error_path: &std::path::Path, context: &str, message: &str) {
        if let Err(e) = self.sink.append_error(error_path, context, message) {
            warn!(error = %e, "Could not append to error file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use crate::testing::{fixtures, MockLogSink, MockScanClient, MockTracker};

    fn config(dry_run: bool) -> Config {
        let toml = format!(
            r#"
[scan]
endpoint = "https://api.example.io"
api_token = "tok"
project_id = "proj-1"

[run]
dry_run = {dry_run}
"#
        );
        load_config_from_str(&toml).unwrap()
    }

    fn orgs() -> BTreeMap<String, String> {
        [("Billing".to_string(), "org-1".to_string())].into()
    }

    #[tokio::test]
    async fn test_empty_delta_is_not_a_failure() {
        let scanner = Arc::new(MockScanClient::new());
        scanner
            .set_details(fixtures::project_info("proj-1", "acme/billing:package.json"))
            .await;
        scanner.set_vulns("proj-1", vec![]).await;
        let tracker = Arc::new(MockTracker::new());
        let sink = Arc::new(MockLogSink::new());

        let reporter = RunReporter::new(scanner, tracker, Arc::clone(&sink) as Arc<dyn LogSink>, &config(false));
        let summary = reporter.run(&orgs(), &RepoDirectory::new()).await.unwrap();

        assert_eq!(summary.processed_count(), 1);
        assert_eq!(
            summary.reports[0].outcome,
            ProjectOutcome::NoTicketsRequired
        );
        // The run log is still written, once, even when empty.
        assert_eq!(sink.write_count(), 1);
    }

    #[tokio::test]
    async fn test_total_failure_is_processed_not_skipped() {
        let scanner = Arc::new(MockScanClient::new());
        scanner
            .set_details(fixtures::project_info("proj-1", "acme/billing:package.json"))
            .await;
        scanner
            .set_vulns(
                "proj-1",
                vec![fixtures::resolved("ISSUE-1", "a@1 > b@2", "mature")],
            )
            .await;
        let tracker = Arc::new(MockTracker::new());
        tracker.fail_all_creations().await;
        let sink = Arc::new(MockLogSink::new());

        let reporter = RunReporter::new(scanner, tracker, sink, &config(false));
        let summary = reporter.run(&orgs(), &RepoDirectory::new()).await.unwrap();

        assert_eq!(summary.processed_count(), 1);
        assert!(summary.skipped.is_empty());
        assert_eq!(
            summary.reports[0].outcome,
            ProjectOutcome::TotalFailure {
                not_created: vec!["ISSUE-1".to_string()]
            }
        );
    }
}
