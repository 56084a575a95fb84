//! Mock repository directory source.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::directory::{DirectoryError, DirectorySource, RepoDirectory, RepoRecord};

/// Mock implementation of [`DirectorySource`].
#[derive(Default)]
pub struct MockDirectory {
    repos: Arc<RwLock<RepoDirectory>>,
    fail: Arc<RwLock<bool>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_repo(&self, name: &str, manager: &str) {
        self.repos.write().await.insert(
            name.to_string(),
            RepoRecord {
                manager: manager.to_string(),
                tracker_user_id: String::new(),
            },
        );
    }

    pub async fn fail_loading(&self) {
        *self.fail.write().await = true;
    }
}

#[async_trait]
impl DirectorySource for MockDirectory {
    async fn load_all(
        &self,
        _region: Option<&str>,
        _profile: Option<&str>,
    ) -> Result<RepoDirectory, DirectoryError> {
        if *self.fail.read().await {
            return Err(DirectoryError::ConnectionFailed(
                "mock failure".to_string(),
            ));
        }
        Ok(self.repos.read().await.clone())
    }
}
