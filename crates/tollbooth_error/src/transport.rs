//! Transport-level error types.

/// Ways a single network round trip can fail before a status is seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TransportErrorKind {
    /// Request timed out
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// Connection could not be established or was reset
    #[display("Connection failed: {}", _0)]
    Connection(String),
    /// Request URL could not be built
    #[display("Invalid URL: {}", _0)]
    InvalidUrl(String),
    /// Request could not be constructed or sent
    #[display("Request failed: {}", _0)]
    Request(String),
    /// Response body could not be read
    #[display("Failed to read response body: {}", _0)]
    Body(String),
}

impl TransportErrorKind {
    /// Timeouts and connection failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportErrorKind::Timeout(_) | TransportErrorKind::Connection(_)
        )
    }
}

/// Transport error with location tracking.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::Timeout("30s elapsed".to_string()));
/// assert!(err.kind.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    /// The kind of error that occurred
    pub kind: TransportErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransportError {
    /// Create a new transport error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
