//! Rate-limit detection for hosting API responses.
//!
//! Two kinds of limits are distinguished:
//! - **Primary**: the hourly quota is exhausted (`x-ratelimit-remaining: 0`);
//!   the wait comes from `x-ratelimit-reset` or `retry-after`.
//! - **Secondary**: abuse detection tripped; the wait comes from
//!   `retry-after`, or a configured fallback.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;

const RETRY_AFTER: &str = "retry-after";
const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// A rate-limit condition and the backoff the server asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimit {
    Primary { retry_after: Duration },
    Secondary { retry_after: Duration },
}

impl RateLimit {
    pub fn retry_after(&self) -> Duration {
        match self {
            RateLimit::Primary { retry_after } | RateLimit::Secondary { retry_after } => {
                *retry_after
            }
        }
    }
}

/// Classifies a response as rate limited, or returns `None`.
///
/// Only 403 and 429 responses are considered.
pub fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    now: DateTime<Utc>,
    fallback: Duration,
) -> Option<RateLimit> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let retry_after = header_u64(headers, RETRY_AFTER).map(Duration::from_secs);

    if body.to_ascii_lowercase().contains("secondary rate") {
        return Some(RateLimit::Secondary {
            retry_after: retry_after.unwrap_or(fallback),
        });
    }

    if header_u64(headers, RATELIMIT_REMAINING) == Some(0) {
        let until_reset = header_u64(headers, RATELIMIT_RESET).map(|reset| {
            let secs = reset as i64 - now.timestamp();
            Duration::from_secs(secs.max(0) as u64)
        });
        return Some(RateLimit::Primary {
            retry_after: retry_after.or(until_reset).unwrap_or(Duration::ZERO),
        });
    }

    // A bare Retry-After on 403/429 is how abuse limits usually arrive.
    retry_after.map(|retry_after| RateLimit::Secondary { retry_after })
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const FALLBACK: Duration = Duration::from_secs(60);

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn ignores_other_statuses() {
        let h = headers(&[("x-ratelimit-remaining", "0")]);
        assert_eq!(classify(StatusCode::NOT_FOUND, &h, "", Utc::now(), FALLBACK), None);
    }

    #[test]
    fn primary_waits_until_reset() {
        let now = Utc::now();
        let reset = (now.timestamp() + 42).to_string();
        let h = headers(&[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", reset.as_str())]);
        let limit = classify(StatusCode::FORBIDDEN, &h, "API rate limit exceeded", now, FALLBACK);
        assert_eq!(
            limit,
            Some(RateLimit::Primary {
                retry_after: Duration::from_secs(42)
            })
        );
    }

    #[test]
    fn primary_reset_in_past_retries_immediately() {
        let now = Utc::now();
        let reset = (now.timestamp() - 10).to_string();
        let h = headers(&[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", reset.as_str())]);
        let limit = classify(StatusCode::FORBIDDEN, &h, "", now, FALLBACK).unwrap();
        assert_eq!(limit.retry_after(), Duration::ZERO);
    }

    #[test]
    fn secondary_from_message_uses_fallback() {
        let body = r#"{"message":"You have exceeded a secondary rate limit."}"#;
        let limit = classify(StatusCode::FORBIDDEN, &HeaderMap::new(), body, Utc::now(), FALLBACK);
        assert_eq!(limit, Some(RateLimit::Secondary { retry_after: FALLBACK }));
    }

    #[test]
    fn secondary_from_retry_after_header() {
        let h = headers(&[("retry-after", "5")]);
        let limit = classify(StatusCode::TOO_MANY_REQUESTS, &h, "", Utc::now(), FALLBACK);
        assert_eq!(
            limit,
            Some(RateLimit::Secondary {
                retry_after: Duration::from_secs(5)
            })
        );
    }

    #[test]
    fn plain_forbidden_is_not_rate_limited() {
        let h = headers(&[("x-ratelimit-remaining", "4999")]);
        let body = r#"{"message":"Resource not accessible by integration"}"#;
        assert_eq!(classify(StatusCode::FORBIDDEN, &h, body, Utc::now(), FALLBACK), None);
    }
}
