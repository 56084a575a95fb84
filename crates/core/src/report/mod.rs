//! Run reporting: per-project orchestration and the consolidated run log.

mod reporter;
mod run_log;

pub use reporter::{
    ProjectOutcome, ProjectReport, ReportError, RunReporter, RunSummary, SkippedProject, Step,
};
pub use run_log::RunLog;
