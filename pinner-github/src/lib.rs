//! GitHub release access for plugins-pinner.
//!
//! Provides the read side of plugin synchronization:
//! - Repository reference parsing from user-supplied URLs
//! - Release lookup by exact version tag
//! - Asset location (bundle, descriptor, optional stylesheet)
//! - Asset downloads with rate-limit aware retries
//! - A runtime-swappable bearer token

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod release_client;
pub mod repo_ref;
pub mod types;

pub use config::GitHubConfig;
pub use error::{GitHubError, GitHubResult};
pub use release_client::ReleaseClient;
pub use repo_ref::{compare_versions, RepoRef};
pub use types::*;
