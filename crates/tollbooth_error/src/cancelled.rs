//! Cancellation error types.

/// Why a call stopped before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CancelledErrorKind {
    /// The caller cancelled the call
    #[display("operation cancelled")]
    Cancelled,
    /// The call's deadline elapsed
    #[display("deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation error with location tracking.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{CancelledError, CancelledErrorKind};
///
/// let err = CancelledError::new(CancelledErrorKind::DeadlineExceeded);
/// assert!(format!("{}", err).contains("deadline exceeded"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cancelled: {} at line {} in {}", kind, line, file)]
pub struct CancelledError {
    /// The kind of cancellation
    pub kind: CancelledErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CancelledError {
    /// Create a new cancellation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CancelledErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
