//! Error types for the Tollbooth request pipeline.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! [`TollboothError`] boxes every kind and exposes an [`ErrorCategory`] so
//! callers can branch on quota, transport, protocol, domain and cancellation
//! failures without inspecting messages.
//!
//! # Examples
//!
//! ```
//! use tollbooth_error::{ErrorCategory, TollboothResult, HttpError};
//!
//! fn fetch_data() -> TollboothResult<String> {
//!     Err(HttpError::new(500, "Internal Server Error", "/search"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => assert_eq!(e.category(), ErrorCategory::Protocol),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancelled;
mod config;
mod domain;
mod error;
mod http;
mod json;
mod quota;
mod transport;

pub use cancelled::{CancelledError, CancelledErrorKind};
pub use config::ConfigError;
pub use domain::{ApiErrorDetail, ApiErrors, DomainError};
pub use error::{ErrorCategory, RetryableError, TollboothError, TollboothErrorKind, TollboothResult};
pub use http::{HttpError, StatusClass};
pub use json::{JsonContext, JsonError};
pub use quota::{QuotaError, QuotaScope};
pub use transport::{TransportError, TransportErrorKind};
