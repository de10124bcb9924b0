//! HTTP client for the GitHub releases API.
//!
//! Handles optional bearer-token authentication, throttled retries on
//! rate-limit responses, release lookup by tag and asset downloads.
//! Uses reqwest with JSON deserialization.

use crate::config::{GitHubConfig, RATE_LIMIT_AUTHENTICATED, RATE_LIMIT_UNAUTHENTICATED};
use crate::error::{GitHubError, GitHubResult};
use crate::rate_limit::{self, RateLimit};
use crate::repo_ref::RepoRef;
use crate::types::{Release, ReleaseAsset};
use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// HTTP client for release lookups and asset downloads.
///
/// The token lives behind a lock shared by all requests, so it can be
/// swapped while the client is in use. Each request reads it once.
pub struct ReleaseClient {
    client: Client,
    config: GitHubConfig,
    token: Arc<RwLock<Option<String>>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ReleaseClient {
    pub fn new(config: GitHubConfig) -> GitHubResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GitHubError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    // ── Auth ──

    /// Replaces the bearer token used by subsequent requests.
    /// An empty or whitespace-only token switches to unauthenticated access.
    pub async fn set_token(&self, token: &str) {
        let token = token.trim();
        let mut current = self.token.write().await;
        *current = (!token.is_empty()).then(|| token.to_string());
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Hourly request quota for the current credential.
    pub async fn hourly_quota(&self) -> u32 {
        if self.is_authenticated().await {
            RATE_LIMIT_AUTHENTICATED
        } else {
            RATE_LIMIT_UNAUTHENTICATED
        }
    }

    // ── Releases ──

    /// Fetches the release tagged exactly `version`.
    ///
    /// No "v" prefix handling is done; the tag must match as given.
    pub async fn fetch_release(&self, repo: &RepoRef, version: &str) -> GitHubResult<Release> {
        let path = format!(
            "/repos/{}/{}/releases/tags/{}",
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo),
            urlencoding::encode(version)
        );

        let resp = self.api_get(&path).await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound(format!(
                "no release tagged {version} in {repo}"
            )));
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GitHubError::Api(format!(
                "HTTP {status} for GET {path}: {}",
                api_message(&body)
            )));
        }

        let release: Release = resp.json().await?;
        debug!(
            "fetched release {} of {repo} with {} assets",
            release.tag,
            release.assets.len()
        );
        Ok(release)
    }

    // ── Assets ──

    /// Downloads an asset's raw bytes from its direct download URL.
    pub async fn download_binary(&self, asset: &ReleaseAsset) -> GitHubResult<Vec<u8>> {
        let resp = self.download(asset).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Downloads an asset as text, byte for byte as served.
    ///
    /// A body that is not valid UTF-8 is a download error, never decoded lossily.
    pub async fn download_text(&self, asset: &ReleaseAsset) -> GitHubResult<String> {
        let bytes = self.download_binary(asset).await?;
        String::from_utf8(bytes)
            .map_err(|e| GitHubError::Download(format!("{}: not valid UTF-8: {e}", asset.name)))
    }

    async fn download(&self, asset: &ReleaseAsset) -> GitHubResult<reqwest::Response> {
        debug!("downloading asset {} from {}", asset.name, asset.download_url);

        self.client
            .get(&asset.download_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| GitHubError::Download(format!("{}: {e}", asset.name)))
    }

    // ── Transport ──

    /// Makes an API GET request, retrying on rate-limit responses.
    ///
    /// Primary limits are retried up to `max_rate_limit_retries` times and
    /// secondary limits up to `max_secondary_retries` times, each after the
    /// backoff the server asked for. Any other response is returned as is.
    async fn api_get(&self, path: &str) -> GitHubResult<reqwest::Response> {
        let url = format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path);
        let fallback = Duration::from_secs(self.config.default_retry_after_secs);
        let mut primary_retries = 0;
        let mut secondary_retries = 0;

        loop {
            let token = self.token.read().await.clone();

            let mut req = self
                .client
                .get(&url)
                .header(ACCEPT, JSON_MEDIA_TYPE)
                .header(API_VERSION_HEADER, API_VERSION);
            if let Some(token) = &token {
                req = req.bearer_auth(token);
            }

            let resp = req.send().await?;
            let status = resp.status();
            if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
                return Ok(resp);
            }

            let headers = resp.headers().clone();
            let body = resp.text().await.unwrap_or_default();

            match rate_limit::classify(status, &headers, &body, Utc::now(), fallback) {
                Some(RateLimit::Primary { retry_after }) => {
                    warn!("request quota exhausted for GET {path}");
                    if primary_retries >= self.config.max_rate_limit_retries {
                        return Err(GitHubError::RateLimited(format!(
                            "quota exhausted for GET {path} after {primary_retries} retries"
                        )));
                    }
                    primary_retries += 1;
                    info!("retrying GET {path} after {}s", retry_after.as_secs());
                    tokio::time::sleep(retry_after).await;
                }
                Some(RateLimit::Secondary { retry_after }) => {
                    warn!("secondary rate limit detected for GET {path}");
                    if secondary_retries >= self.config.max_secondary_retries {
                        return Err(GitHubError::RateLimited(format!(
                            "secondary rate limit for GET {path}"
                        )));
                    }
                    secondary_retries += 1;
                    info!("retrying GET {path} after {}s", retry_after.as_secs());
                    tokio::time::sleep(retry_after).await;
                }
                None => {
                    return Err(GitHubError::Api(format!(
                        "HTTP {status} for GET {path}: {}",
                        api_message(&body)
                    )));
                }
            }
        }
    }
}

/// Extracts the `message` field of an API error body, falling back to the raw text.
fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
