//! Client-side rate limiting for quota-constrained APIs.
//!
//! [`RateLimiter`] enforces independent per-minute and per-day quotas,
//! honours server-advised blackouts (`Retry-After`) and reconciles its local
//! counts with the counters servers report in response headers
//! ([`QuotaSnapshot`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod headers;
mod limiter;

pub use config::{QuotaHeaderNames, QuotaHeaderNamesBuilder, RateLimitConfig, RateLimitConfigBuilder};
pub use headers::QuotaSnapshot;
pub use limiter::{RateLimitStats, RateLimiter};
