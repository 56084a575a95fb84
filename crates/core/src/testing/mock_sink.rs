//! Mock log sink recording writes in memory.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::logfile::{LogError, LogSink};
use crate::report::RunLog;

/// Mock implementation of [`LogSink`]. Nothing touches the filesystem;
/// written logs and appended errors are kept for assertions.
#[derive(Default)]
pub struct MockLogSink {
    created: Mutex<Vec<PathBuf>>,
    written: Mutex<Vec<RunLog>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl MockLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }

    pub fn last_written(&self) -> Option<RunLog> {
        self.written.lock().unwrap().last().cloned()
    }

    pub fn recorded_errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }
}

impl LogSink for MockLogSink {
    fn create_run_file(&self, prefix: &str) -> Result<PathBuf, LogError> {
        let mut created = self.created.lock().unwrap();
        let path = PathBuf::from(format!("/mock/{}{}.json", prefix, created.len()));
        created.push(path.clone());
        Ok(path)
    }

    fn write(&self, log: &RunLog, _path: &Path) -> Result<(), LogError> {
        self.written.lock().unwrap().push(log.clone());
        Ok(())
    }

    fn append_error(&self, _path: &Path, context: &str, message: &str) -> Result<(), LogError> {
        self.errors
            .lock()
            .unwrap()
            .push((context.to_string(), message.to_string()));
        Ok(())
    }
}
