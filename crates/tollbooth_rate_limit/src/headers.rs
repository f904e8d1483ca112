//! Authoritative quota counters parsed from response headers.

use crate::QuotaHeaderNames;
use reqwest::header::HeaderMap;
use tracing::{debug, instrument};

/// Server-reported quota counters. Absent or malformed headers are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaSnapshot {
    /// Minute-window capacity
    pub minute_limit: Option<u32>,
    /// Minute-window remaining requests
    pub minute_remaining: Option<u32>,
    /// Day-window capacity
    pub day_limit: Option<u32>,
    /// Day-window remaining requests
    pub day_remaining: Option<u32>,
}

impl QuotaSnapshot {
    /// Whether any counter was present.
    pub fn is_empty(&self) -> bool {
        self.minute_limit.is_none()
            && self.minute_remaining.is_none()
            && self.day_limit.is_none()
            && self.day_remaining.is_none()
    }

    /// Parse counters from response headers.
    ///
    /// # Example
    ///
    /// ```
    /// use reqwest::header::{HeaderMap, HeaderValue};
    /// use tollbooth_rate_limit::{QuotaHeaderNames, QuotaSnapshot};
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("x-burstlimit-remaining", HeaderValue::from_static("12"));
    /// headers.insert("x-ratelimit-remaining", HeaderValue::from_static("oops"));
    ///
    /// let snapshot = QuotaSnapshot::from_headers(&headers, &QuotaHeaderNames::default());
    /// assert_eq!(snapshot.minute_remaining, Some(12));
    /// assert_eq!(snapshot.day_remaining, None);
    /// ```
    #[instrument(skip_all)]
    pub fn from_headers(headers: &HeaderMap, names: &QuotaHeaderNames) -> Self {
        let snapshot = Self {
            minute_limit: parse_header_u32(headers, names.minute_limit()),
            minute_remaining: parse_header_u32(headers, names.minute_remaining()),
            day_limit: parse_header_u32(headers, names.day_limit()),
            day_remaining: parse_header_u32(headers, names.day_remaining()),
        };
        if !snapshot.is_empty() {
            debug!(?snapshot, "Parsed quota headers");
        }
        snapshot
    }
}

fn parse_header_u32(headers: &HeaderMap, key: &str) -> Option<u32> {
    headers.get(key)?.to_str().ok()?.trim().parse().ok()
}
