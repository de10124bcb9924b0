//! GitHub client error types.

use thiserror::Error;

/// Result type for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Errors that can occur while talking to the hosting API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("asset download failed: {0}")]
    Download(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GitHubError {
    /// Returns true if no release or asset matched the request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound(_))
    }

    /// Returns true if the request gave up after exhausting rate-limit retries.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GitHubError::RateLimited(_))
    }
}
