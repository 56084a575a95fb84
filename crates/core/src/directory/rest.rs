//! HTTP client for the repository directory service.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{DirectoryError, DirectorySource, RepoDirectory, RepoRecord};

/// REST implementation of [`DirectorySource`].
pub struct RestDirectoryClient {
    client: Client,
    base_url: String,
}

impl RestDirectoryClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn repos_url(&self, region: Option<&str>, profile: Option<&str>) -> String {
        let mut url = format!("{}/repos", self.base_url);
        let mut sep = '?';
        if let Some(region) = region {
            url.push(sep);
            url.push_str("region=");
            url.push_str(&urlencoding::encode(region));
            sep = '&';
        }
        if let Some(profile) = profile {
            url.push(sep);
            url.push_str("profile=");
            url.push_str(&urlencoding::encode(profile));
        }
        url
    }
}

#[async_trait::async_trait]
impl DirectorySource for RestDirectoryClient {
    async fn load_all(
        &self,
        region: Option<&str>,
        profile: Option<&str>,
    ) -> Result<RepoDirectory, DirectoryError> {
        let url = self.repos_url(region, profile);
        debug!(url = %url, "Loading repository directory");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let repos: Vec<DirectoryRepo> = response
            .json()
            .await
            .map_err(|e| DirectoryError::ParseError(e.to_string()))?;

        Ok(repos
            .into_iter()
            .map(|r| {
                (
                    r.name,
                    RepoRecord {
                        manager: r.manager,
                        tracker_user_id: String::new(),
                    },
                )
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryRepo {
    name: String,
    manager: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repos_url_without_params() {
        let client = RestDirectoryClient::new("https://cmdb.internal/");
        assert_eq!(client.repos_url(None, None), "https://cmdb.internal/repos");
    }

    #[test]
    fn test_repos_url_with_params() {
        let client = RestDirectoryClient::new("https://cmdb.internal");
        assert_eq!(
            client.repos_url(Some("eu-west-1"), Some("appsec")),
            "https://cmdb.internal/repos?region=eu-west-1&profile=appsec"
        );
    }

    #[test]
    fn test_parse_directory_listing() {
        let body = r#"[
            { "name": "acme/billing", "manager": "alice" },
            { "name": "acme/web", "manager": "bob" }
        ]"#;
        let repos: Vec<DirectoryRepo> = serde_json::from_str(body).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].manager, "alice");
    }
}
