//! Top-level error wrapper types.

use crate::{
    CancelledError, ConfigError, DomainError, HttpError, JsonError, QuotaError, TransportError,
};
use std::time::Duration;

/// Every failure the pipeline can surface.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{TollboothError, HttpError};
///
/// let http_err = HttpError::new(503, "Service Unavailable", "/search");
/// let err: TollboothError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TollboothErrorKind {
    /// Local or server-imposed quota exhaustion
    #[from(QuotaError)]
    Quota(QuotaError),
    /// Network round trip failed
    #[from(TransportError)]
    Transport(TransportError),
    /// Non-success HTTP status
    #[from(HttpError)]
    Http(HttpError),
    /// Errors embedded in a successful payload
    #[from(DomainError)]
    Domain(DomainError),
    /// Caller cancellation or deadline
    #[from(CancelledError)]
    Cancelled(CancelledError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Broad error category for branching without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ErrorCategory {
    /// Rate limiter refused the call
    #[display("quota")]
    Quota,
    /// Network-level failure
    #[display("transport")]
    Transport,
    /// HTTP status failure
    #[display("protocol")]
    Protocol,
    /// Service-reported failure in a 2xx payload
    #[display("domain")]
    Domain,
    /// Cancelled or deadline exceeded
    #[display("cancelled")]
    Cancelled,
    /// Invalid configuration
    #[display("config")]
    Config,
    /// Payload could not be (de)serialized
    #[display("json")]
    Json,
}

/// Tollbooth error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{ConfigError, ErrorCategory, TollboothResult};
///
/// fn might_fail() -> TollboothResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Config);
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tollbooth Error: {}", _0)]
pub struct TollboothError(Box<TollboothErrorKind>);

impl TollboothError {
    /// Create a new error from a kind.
    pub fn new(kind: TollboothErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TollboothErrorKind {
        &self.0
    }

    /// Consume the wrapper and return the kind.
    pub fn into_kind(self) -> TollboothErrorKind {
        *self.0
    }

    /// Broad category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            TollboothErrorKind::Quota(_) => ErrorCategory::Quota,
            TollboothErrorKind::Transport(_) => ErrorCategory::Transport,
            TollboothErrorKind::Http(_) => ErrorCategory::Protocol,
            TollboothErrorKind::Domain(_) => ErrorCategory::Domain,
            TollboothErrorKind::Cancelled(_) => ErrorCategory::Cancelled,
            TollboothErrorKind::Config(_) => ErrorCategory::Config,
            TollboothErrorKind::Json(_) => ErrorCategory::Json,
        }
    }

    /// HTTP status, when the failure came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self.kind() {
            TollboothErrorKind::Http(e) => Some(e.status_code),
            _ => None,
        }
    }

    /// Server-advised retry delay, when one was sent.
    pub fn retry_after(&self) -> Option<Duration> {
        match self.kind() {
            TollboothErrorKind::Http(e) => e.retry_after,
            _ => None,
        }
    }

    /// True for caller cancellation and deadline expiry.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind(), TollboothErrorKind::Cancelled(_))
    }
}

// Generic From implementation for any type that converts to TollboothErrorKind
impl<T> From<T> for TollboothError
where
    T: Into<TollboothErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Errors that know whether repeating the operation could succeed.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{HttpError, RetryableError, TollboothError};
///
/// let err: TollboothError = HttpError::new(503, "Service Unavailable", "/search").into();
/// assert!(err.is_retryable());
///
/// let err: TollboothError = HttpError::new(401, "Unauthorized", "/search").into();
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error is transient.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for TollboothErrorKind {
    fn is_retryable(&self) -> bool {
        match self {
            TollboothErrorKind::Quota(e) => e.is_retryable(),
            TollboothErrorKind::Transport(e) => e.kind.is_retryable(),
            TollboothErrorKind::Http(e) => e.is_retryable(),
            TollboothErrorKind::Domain(_)
            | TollboothErrorKind::Cancelled(_)
            | TollboothErrorKind::Config(_)
            | TollboothErrorKind::Json(_) => false,
        }
    }
}

impl RetryableError for TollboothError {
    fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Result type for Tollbooth operations.
pub type TollboothResult<T> = std::result::Result<T, TollboothError>;
