//! Release client configuration.

use serde::{Deserialize, Serialize};

/// Hourly request quota for unauthenticated API calls.
pub const RATE_LIMIT_UNAUTHENTICATED: u32 = 60;

/// Hourly request quota for token-authenticated API calls.
pub const RATE_LIMIT_AUTHENTICATED: u32 = 5000;

/// Configuration for the GitHub release client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Base URL for the REST API (e.g., "https://api.github.com").
    pub api_base_url: String,

    /// User-Agent sent with every request. The API rejects requests without one.
    pub user_agent: String,

    /// Retries allowed after a primary rate-limit response.
    pub max_rate_limit_retries: u32,

    /// Retries allowed after a secondary (abuse-detection) rate-limit response.
    pub max_secondary_retries: u32,

    /// Backoff used when a secondary limit does not say how long to wait (seconds).
    pub default_retry_after_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            user_agent: concat!("plugins-pinner/", env!("CARGO_PKG_VERSION")).to_string(),
            max_rate_limit_retries: 3,
            max_secondary_retries: 1,
            default_retry_after_secs: 60,
        }
    }
}

impl GitHubConfig {
    /// Creates a config pointing at a different API host (mock servers, GHES).
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}
