//! GitHub compare API release comparator

use serde::Deserialize;
use tracing::{debug, warn};

use crate::version::error::FetchError;
use crate::version::remote::{ReleaseComparator, ReleaseRelation};

/// Default base URL for GitHub API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

const GITHUB_HOSTS: [&str; 3] = ["https://github.com/", "http://github.com/", "git@github.com:"];

/// Response from GitHub compare API
#[derive(Debug, Deserialize)]
struct Comparison {
    status: String,
    ahead_by: Option<u64>,
    behind_by: Option<u64>,
}

/// Compares commits against release tags with `GET /repos/{repo}/compare/{tag}...{commit}`
pub struct GitHubComparator {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubComparator {
    /// Creates a new GitHubComparator with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("action-update-checker")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for GitHubComparator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// `owner/repo` for a github.com clone URL
pub fn github_repo(url: &str) -> Option<String> {
    let path = GITHUB_HOSTS.iter().find_map(|host| url.strip_prefix(host))?;
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut parts = path.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Some(format!("{owner}/{repo}"))
        }
        _ => None,
    }
}

#[async_trait::async_trait]
impl ReleaseComparator for GitHubComparator {
    async fn compare(
        &self,
        url: &str,
        release_tag: &str,
        commit: &str,
    ) -> Result<ReleaseRelation, FetchError> {
        let Some(repo) = github_repo(url) else {
            debug!("{} is not hosted on GitHub; no comparison available", url);
            return Ok(ReleaseRelation::Unrelated);
        };

        let api_url = format!(
            "{}/repos/{}/compare/{}...{}",
            self.base_url, repo, release_tag, commit
        );

        let response = self
            .client
            .get(&api_url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            debug!("No comparison between {} and {} in {}", release_tag, commit, repo);
            return Ok(ReleaseRelation::Unrelated);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, api_url);
            return Err(FetchError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let comparison: Comparison = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub compare response: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        match comparison.status.as_str() {
            "behind" | "identical" => Ok(ReleaseRelation::ReachableBehind {
                behind_by: comparison.behind_by,
            }),
            "ahead" | "diverged" => Ok(ReleaseRelation::Diverged {
                ahead_by: comparison.ahead_by,
                behind_by: comparison.behind_by,
            }),
            other => Err(FetchError::InvalidResponse(format!(
                "Unknown comparison status: {}",
                other
            ))),
        }
    }
}
