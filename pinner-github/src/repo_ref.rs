//! Repository reference parsing and version comparison.
//!
//! A repository reference is always recomputed from the user-supplied URL;
//! it is never persisted on its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Host substring a repository URL must contain.
pub const HOSTING_DOMAIN: &str = "github.com";

/// Owner/repository pair identifying a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses a repository URL into its owner and repo.
    ///
    /// Accepted shapes include `https://github.com/owner/repo`,
    /// `https://github.com/owner/repo.git`, `https://github.com/owner/repo/`
    /// and `github.com/owner/repo`. Only the structure is checked; the
    /// repository is not looked up. Returns `None` for anything else.
    pub fn parse(url: &str) -> Option<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let parsed = Url::parse(&with_scheme).ok()?;
        if !parsed.host_str()?.contains(HOSTING_DOMAIN) {
            return None;
        }

        let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = segments.next()?;

        Some(Self::new(owner, repo))
    }

    /// Returns true if `url` parses into a repository reference.
    pub fn is_valid(url: &str) -> bool {
        Self::parse(url).is_some()
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Compares two dotted version strings numerically.
///
/// Components are compared left to right; missing or non-numeric components
/// count as 0. Returns the difference of the first mismatching pair, so the
/// sign gives the ordering and 0 means equal.
///
/// The sync engine does not use this to decide whether a plugin is up to
/// date; it compares tags for exact equality.
pub fn compare_versions(a: &str, b: &str) -> i64 {
    let parts_a: Vec<i64> = a.split('.').map(leading_int).collect();
    let parts_b: Vec<i64> = b.split('.').map(leading_int).collect();

    let len = parts_a.len().max(parts_b.len());
    for i in 0..len {
        let x = parts_a.get(i).copied().unwrap_or(0);
        let y = parts_b.get(i).copied().unwrap_or(0);
        if x != y {
            return x.saturating_sub(y);
        }
    }

    0
}

/// Parses the leading integer of a version component ("3rc1" -> 3, "x" -> 0).
fn leading_int(component: &str) -> i64 {
    let s = component.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}
