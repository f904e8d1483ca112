//! Quota error types raised by the rate limiter.

use std::time::Duration;

/// Which quota refused the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum QuotaScope {
    /// Per-minute burst window exhausted
    #[display("minute")]
    Minute,
    /// Per-day window exhausted
    #[display("day")]
    Day,
    /// Server-imposed backoff still in effect
    #[display("blackout")]
    Blackout,
}

/// Quota exhaustion with the refusing scope, its capacity and time until reset.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tollbooth_error::{QuotaError, QuotaScope};
///
/// let err = QuotaError::new(QuotaScope::Day, 1000, Duration::from_secs(3600));
/// assert_eq!(err.scope, QuotaScope::Day);
/// assert!(format!("{}", err).contains("day rate limit exceeded"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Quota Error: {} rate limit exceeded (limit: {}, resets in: {:?}) at line {} in {}",
    scope,
    limit,
    reset_in,
    line,
    file
)]
pub struct QuotaError {
    /// Scope that refused the request
    pub scope: QuotaScope,
    /// Capacity of the refusing window (zero for a blackout)
    pub limit: u32,
    /// Time until the scope admits requests again
    pub reset_in: Duration,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl QuotaError {
    /// Create a new quota error with automatic location tracking.
    #[track_caller]
    pub fn new(scope: QuotaScope, limit: u32, reset_in: Duration) -> Self {
        let location = std::panic::Location::caller();
        Self {
            scope,
            limit,
            reset_in,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether waiting out `reset_in` is a sensible recovery.
    ///
    /// Daily exhaustion is terminal for practical purposes.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.scope, QuotaScope::Day)
    }
}
