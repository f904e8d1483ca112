//! Configuration error types.

/// Invalid or unreadable configuration with source location.
///
/// # Examples
///
/// ```
/// use tollbooth_error::ConfigError;
///
/// let err = ConfigError::for_key("retry.jitter", "must be between 0.0 and 1.0");
/// assert_eq!(err.key.as_deref(), Some("retry.jitter"));
/// assert!(format!("{}", err).contains("retry.jitter: must be"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {}{} at line {} in {}", key_prefix(key), message, line, file)]
pub struct ConfigError {
    /// Offending setting, when one can be named
    pub key: Option<String>,
    /// What is wrong
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

fn key_prefix(key: &Option<String>) -> String {
    key.as_ref().map(|k| format!("{}: ", k)).unwrap_or_default()
}

impl ConfigError {
    /// Error not tied to a single setting.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            key: None,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Error about one named setting.
    #[track_caller]
    pub fn for_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            key: Some(key.into()),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
