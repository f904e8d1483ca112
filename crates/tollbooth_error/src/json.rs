//! JSON serialization error types.

/// What was being (de)serialized when JSON handling failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonContext {
    /// Outgoing request body
    #[display("request body")]
    RequestBody,
    /// Parameters hashed into a cache key
    #[display("cache key")]
    CacheKey,
    /// Incoming response payload
    #[display("response payload")]
    Response,
}

/// JSON serialization/deserialization error with source location.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{JsonContext, JsonError};
///
/// let err = JsonError::new(JsonContext::Response, "expected value at line 1 column 1");
/// assert!(format!("{}", err).contains("response payload"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} ({}) at line {} in {}", message, context, line, file)]
pub struct JsonError {
    /// What was being processed
    pub context: JsonContext,
    /// Parser or serializer message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError at the current location.
    #[track_caller]
    pub fn new(context: JsonContext, message: impl ToString) -> Self {
        let location = std::panic::Location::caller();
        Self {
            context,
            message: message.to_string(),
            line: location.line(),
            file: location.file(),
        }
    }
}
