//! Rate limit information carried by `429 Too Many Requests` responses.
//!
//! The client never waits or retries on its own. The parsed information is
//! attached to [`Error::RateLimitExceeded`](crate::Error::RateLimitExceeded)
//! so callers can schedule their own retry.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Information extracted from rate limit headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// When the rate limit resets (`X-RateLimit-Reset`, Unix timestamp).
    pub reset_at: Option<SystemTime>,

    /// How long to wait before retrying (`Retry-After`).
    pub retry_after: Option<Duration>,

    /// Requests allowed per window (`X-RateLimit-Limit`).
    pub limit: Option<u64>,

    /// Requests remaining in the current window (`X-RateLimit-Remaining`).
    pub remaining: Option<u64>,
}

impl RateLimitInfo {
    /// Extracts rate limit information from response headers.
    ///
    /// Returns `None` when none of the recognized headers is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use iconfinder::rate_limit::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "60".parse().unwrap());
    /// headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers).unwrap();
    /// assert_eq!(info.remaining, Some(0));
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let info = Self {
            reset_at: header_u64(headers, "x-ratelimit-reset")
                .map(|secs| UNIX_EPOCH + Duration::from_secs(secs)),
            retry_after: parse_retry_after(headers),
            limit: header_u64(headers, "x-ratelimit-limit"),
            remaining: header_u64(headers, "x-ratelimit-remaining"),
        };

        let empty = info.reset_at.is_none()
            && info.retry_after.is_none()
            && info.limit.is_none()
            && info.remaining.is_none();
        (!empty).then_some(info)
    }

    /// Returns the recommended delay before retrying, capped at `max_wait`.
    ///
    /// `Retry-After` wins over the reset timestamp. Returns `None` if neither
    /// yields a delay.
    pub fn delay(&self, max_wait: Duration) -> Option<Duration> {
        if let Some(retry_after) = self.retry_after {
            return Some(retry_after.min(max_wait));
        }

        self.reset_at
            .and_then(|reset_at| reset_at.duration_since(SystemTime::now()).ok())
            .map(|until_reset| until_reset.min(max_wait))
    }
}

/// `Retry-After` is either delay-seconds or an HTTP date.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    httpdate::parse_http_date(header)
        .ok()?
        .duration_since(SystemTime::now())
        .ok()
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
