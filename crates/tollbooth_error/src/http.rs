//! HTTP status error types.

use std::time::Duration;

/// Coarse classification of a non-success HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StatusClass {
    /// 400
    #[display("invalid request")]
    BadRequest,
    /// 401
    #[display("unauthorized")]
    Unauthorized,
    /// 403
    #[display("forbidden")]
    Forbidden,
    /// 404
    #[display("not found")]
    NotFound,
    /// 429
    #[display("rate limit exceeded")]
    RateLimited,
    /// Any 5xx
    #[display("server error")]
    Server,
    /// Anything else
    #[display("unexpected status")]
    Other,
}

impl StatusClass {
    /// Classify a status code.
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            400 => StatusClass::BadRequest,
            401 => StatusClass::Unauthorized,
            403 => StatusClass::Forbidden,
            404 => StatusClass::NotFound,
            429 => StatusClass::RateLimited,
            500..=599 => StatusClass::Server,
            _ => StatusClass::Other,
        }
    }
}

/// Non-success HTTP response with source location.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{HttpError, StatusClass};
///
/// let err = HttpError::new(404, "Not Found", "/search/keyword");
/// assert_eq!(err.status_class(), StatusClass::NotFound);
/// assert!(format!("{}", err).contains("HTTP 404"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "HTTP Error: HTTP {} from {}: {} at line {} in {}",
    status_code,
    endpoint,
    message,
    line,
    file
)]
pub struct HttpError {
    /// HTTP status code
    pub status_code: u16,
    /// Status text or server-provided message
    pub message: String,
    /// Endpoint path that failed
    pub endpoint: String,
    /// Server-advised delay before retrying, from `Retry-After`
    pub retry_after: Option<Duration>,
    /// Response body excerpt
    pub details: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError at the current location.
    #[track_caller]
    pub fn new(status_code: u16, message: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            status_code,
            message: message.into(),
            endpoint: endpoint.into(),
            retry_after: None,
            details: String::new(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Attach a server-advised retry delay.
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Attach response body details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Coarse class of the status code.
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_status(self.status_code)
    }

    /// 429 and the transient 5xx statuses.
    pub fn is_retryable(&self) -> bool {
        matches!(self.status_code, 429 | 500 | 502 | 503 | 504)
    }
}
