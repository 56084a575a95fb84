use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// The consolidated, run-scoped record of ticket-creation outcomes across
/// all processed projects. Owned by the reporter and written to disk once,
/// at the end of the run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunLog {
    pub projects: BTreeMap<String, Value>,
}

impl RunLog {
    /// Merge one project's entries: union-with-overwrite. Keys already
    /// accumulated are preserved unless the same key reappears, in which
    /// case the newer value wins.
    pub fn merge_project_log(&mut self, entries: BTreeMap<String, Value>) {
        for (key, value) in entries {
            self.projects.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }
}
