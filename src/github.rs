use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::error::{RepoBrowserError, Result};
use crate::models::{RepositoryKind, RepositorySummary};
use crate::types::GitHubRepo;

pub const API_BASE_URL: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;
const MAX_RETRIES: u32 = 3;

/// Source of repository listings for a target
///
/// The orchestrator only knows this trait; tests substitute scripted
/// implementations.
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch_repositories(
        &self,
        target: &str,
        kind: RepositoryKind,
        token: Option<&str>,
    ) -> Result<Vec<RepositorySummary>>;
}

pub struct GitHubClient {
    client: Client,
    base_url: Url,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.into().trim())?;
        if base_url.cannot_be_a_base() {
            return Err(RepoBrowserError::ValidationError(format!(
                "API base URL cannot carry a path: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent("repo-browser/0.1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            client,
            base_url,
        })
    }

    /// Listing endpoint for `target`, which always occupies exactly one path segment
    pub fn repositories_url(&self, target: &str, kind: RepositoryKind) -> Result<Url> {
        if matches!(target.trim(), "" | "." | "..") {
            return Err(RepoBrowserError::ValidationError(format!(
                "Invalid target name: {:?}",
                target
            )));
        }

        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| {
                RepoBrowserError::ValidationError(format!(
                    "API base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(kind.endpoint_segment())
            .push(target)
            .push("repos");
        url.query_pairs_mut()
            .append_pair("per_page", &PER_PAGE.to_string());

        Ok(url)
    }

    async fn make_request(&self, url: &str, token: Option<&str>) -> Result<Response> {
        let mut retries = 0;

        loop {
            let mut request = self
                .client
                .get(url)
                .header("Accept", "application/vnd.github.v3+json");
            if let Some(token) = token {
                request = request.header("Authorization", format!("token {}", token));
            }
            let response = request.send().await?;

            let rate_limit_remaining = response
                .headers()
                .get("X-RateLimit-Remaining")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u32>().ok());

            let rate_limit_reset = response
                .headers()
                .get("X-RateLimit-Reset")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);

            match response.status() {
                reqwest::StatusCode::OK => {
                    if let Some(remaining) = rate_limit_remaining.filter(|r| *r < 10) {
                        warn!(remaining, "GitHub rate limit running low");
                    }
                    return Ok(response);
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(RepoBrowserError::NotFound(format!("Resource not found: {}", url)));
                }
                reqwest::StatusCode::FORBIDDEN if rate_limit_remaining == Some(0) => {
                    let reset_time = SystemTime::UNIX_EPOCH + Duration::from_secs(rate_limit_reset);
                    let wait_time = reset_time
                        .duration_since(SystemTime::now())
                        .unwrap_or(Duration::from_secs(0));

                    if wait_time > Duration::from_secs(60) {
                        return Err(RepoBrowserError::RateLimitExceeded(format!(
                            "API rate limit exceeded. Reset at: {:?}",
                            reset_time
                        )));
                    }
                    warn!("Rate limit reached. Waiting {} seconds...", wait_time.as_secs() + 1);
                    sleep(wait_time + Duration::from_secs(1)).await;
                }
                status if status.is_server_error() && retries < MAX_RETRIES => {
                    warn!("Server error ({}). Retrying in 2 seconds...", status);
                    sleep(Duration::from_secs(2)).await;
                    retries += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(RepoBrowserError::ApiError(format!(
                        "API request failed with status {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl RepositoryFetcher for GitHubClient {
    async fn fetch_repositories(
        &self,
        target: &str,
        kind: RepositoryKind,
        token: Option<&str>,
    ) -> Result<Vec<RepositorySummary>> {
        let url = self.repositories_url(target, kind)?;
        debug!(%url, authenticated = token.is_some(), "Fetching repositories");

        let response = self.make_request(url.as_str(), token).await?;
        let body = response.text().await?;
        let repos: Vec<GitHubRepo> = serde_json::from_str(&body)?;

        Ok(repos.into_iter().map(RepositorySummary::from).collect())
    }
}
