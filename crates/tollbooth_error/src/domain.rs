//! Errors embedded by the remote service inside successful responses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the service's embedded error list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiErrorDetail {
    /// Numeric identifier
    pub id: i64,
    /// Machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Localisation resource key
    pub resource_key: String,
    /// Offending request property, if any
    pub property_name: String,
}

impl fmt::Display for ApiErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "API error: {}", self.message)
        } else {
            write!(f, "API error [{}]: {}", self.code, self.message)
        }
    }
}

/// Collection of embedded errors.
///
/// # Examples
///
/// ```
/// use tollbooth_error::{ApiErrorDetail, ApiErrors};
///
/// let errors = ApiErrors(vec![
///     ApiErrorDetail { code: "Invalid".into(), message: "bad keyword".into(), ..Default::default() },
///     ApiErrorDetail { message: "too short".into(), ..Default::default() },
/// ]);
/// assert_eq!(errors.to_string(), "2 API errors: bad keyword (and 1 more)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ApiErrors(pub Vec<ApiErrorDetail>);

impl fmt::Display for ApiErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "unknown API error"),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(
                f,
                "{} API errors: {} (and {} more)",
                rest.len() + 1,
                first.message,
                rest.len()
            ),
        }
    }
}

/// Domain failure reported in a 2xx payload with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Domain Error: {} from {} at line {} in {}", errors, endpoint, line, file)]
pub struct DomainError {
    /// Errors reported by the service
    pub errors: ApiErrors,
    /// Endpoint path that produced them
    pub endpoint: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl DomainError {
    /// Create a new DomainError at the current location.
    #[track_caller]
    pub fn new(errors: Vec<ApiErrorDetail>, endpoint: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            errors: ApiErrors(errors),
            endpoint: endpoint.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
