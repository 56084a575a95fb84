//! Run-log artifacts on disk.
//!
//! Two files per run: the consolidated run log, written once at the end,
//! and an error file the reporter appends step failures to as they happen.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::report::RunLog;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not serialize run log: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Sink for the run-scoped log artifacts.
pub trait LogSink: Send + Sync {
    /// Create a new timestamped run file and return its path.
    fn create_run_file(&self, prefix: &str) -> Result<PathBuf, LogError>;

    /// Write the consolidated run log. Called exactly once per run.
    fn write(&self, log: &RunLog, path: &Path) -> Result<(), LogError>;

    /// Append one error line with its originating context.
    fn append_error(&self, path: &Path, context: &str, message: &str) -> Result<(), LogError>;
}

/// Filesystem implementation of [`LogSink`].
pub struct FsLogSink {
    dir: PathBuf,
}

impl FsLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LogSink for FsLogSink {
    fn create_run_file(&self, prefix: &str) -> Result<PathBuf, LogError> {
        fs::create_dir_all(&self.dir)?;
        let filename = format!("{}{}.json", prefix, Utc::now().format("%Y%m%d%H%M%S"));
        let path = self.dir.join(filename);
        File::create(&path)?;
        debug!(path = %path.display(), "Created run file");
        Ok(path)
    }

    fn write(&self, log: &RunLog, path: &Path) -> Result<(), LogError> {
        let serialized = serde_json::to_string_pretty(log)?;
        fs::write(path, serialized)?;
        debug!(path = %path.display(), entries = log.len(), "Wrote run log");
        Ok(())
    }

    fn append_error(&self, path: &Path, context: &str, message: &str) -> Result<(), LogError> {
        let mut file = OpenOptions::new().append(true).open(path)?;
        writeln!(file, "{}: {}", context, message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_create_run_file_uses_prefix() {
        let dir = tempdir().unwrap();
        let sink = FsLogSink::new(dir.path());

        let path = sink.create_run_file("listOfTicketCreated_").unwrap();

        assert!(path.exists());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("listOfTicketCreated_"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn test_write_round_trips_run_log() {
        let dir = tempdir().unwrap();
        let sink = FsLogSink::new(dir.path());
        let path = sink.create_run_file("listOfTicketCreated_").unwrap();

        let mut log = RunLog::default();
        log.merge_project_log(
            [("SEC-1".to_string(), json!({"issueId": "ISSUE-1"}))].into(),
        );
        sink.write(&log, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["projects"]["SEC-1"]["issueId"], "ISSUE-1");
    }

    #[test]
    fn test_append_error_accumulates_lines() {
        let dir = tempdir().unwrap();
        let sink = FsLogSink::new(dir.path());
        let path = sink.create_run_file("ErrorsFile_").unwrap();

        sink.append_error(&path, "getProjectDetails", "boom").unwrap();
        sink.append_error(&path, "getJiraTickets", "bust").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("getProjectDetails: boom"));
        assert!(content.contains("getJiraTickets: bust"));
    }

    #[test]
    fn test_create_run_file_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("logs/run");
        let sink = FsLogSink::new(&nested);

        let path = sink.create_run_file("ErrorsFile_").unwrap();
        assert!(path.starts_with(&nested));
    }
}
