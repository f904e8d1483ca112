//! Failure classification and `Retry-After` parsing.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;
use tollbooth_error::{TollboothError, TollboothErrorKind};

/// Statuses worth repeating: rate limiting and transient server failures.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Decide whether a failed attempt should be repeated.
///
/// Timeouts and connection failures retry, as do the statuses accepted by
/// [`is_retryable_status`]. When `status` is absent the status carried by an
/// HTTP error is used. Everything else, including success, does not retry.
///
/// # Example
///
/// ```
/// use tollbooth_error::{HttpError, TollboothError};
/// use tollbooth_retry::should_retry;
///
/// assert!(should_retry(None, Some(503)));
/// assert!(!should_retry(None, Some(404)));
/// assert!(!should_retry(None, Some(200)));
///
/// let err: TollboothError = HttpError::new(429, "Too Many Requests", "/search").into();
/// assert!(should_retry(Some(&err), None));
/// ```
pub fn should_retry(error: Option<&TollboothError>, status: Option<u16>) -> bool {
    let status = status.or_else(|| error.and_then(TollboothError::status_code));
    if status.is_some_and(is_retryable_status) {
        return true;
    }
    match error.map(TollboothError::kind) {
        Some(TollboothErrorKind::Transport(e)) => e.kind.is_retryable(),
        _ => false,
    }
}

/// Parse a `Retry-After` value: delta seconds or an HTTP date.
///
/// Empty, unparseable, non-positive and past values yield `None`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tollbooth_retry::parse_retry_after;
///
/// assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
/// assert_eq!(parse_retry_after("0"), None);
/// assert_eq!(parse_retry_after("soon"), None);
/// assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
/// ```
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    parse_retry_after_at(value, Utc::now())
}

/// [`parse_retry_after`] relative to an explicit `now`.
pub fn parse_retry_after_at(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(seconds) = value.parse::<i64>() {
        return u64::try_from(seconds)
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs);
    }

    let when = parse_http_date(value)?;
    (when - now).to_std().ok().filter(|d| !d.is_zero())
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%a, %d %b %Y %H:%M:%S GMT")
        .ok()
        .map(|naive| naive.and_utc())
}
