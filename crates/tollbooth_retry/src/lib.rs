//! Retry policy for the Tollbooth request pipeline.
//!
//! - [`should_retry`] separates transient failures from fatal ones
//! - [`RetryConfig::compute_backoff`] spaces attempts exponentially with jitter
//! - [`parse_retry_after`] reads server-advised delays
//!
//! The loop that applies the policy lives in the executor.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod policy;

pub use config::{RetryConfig, RetryConfigBuilder};
pub use policy::{is_retryable_status, parse_retry_after, parse_retry_after_at, should_retry};
