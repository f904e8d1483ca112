//! Rate limit configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Names of the response headers carrying authoritative quota counters.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct QuotaHeaderNames {
    /// Minute-window capacity header
    #[serde(default = "default_minute_limit_header")]
    minute_limit: String,
    /// Minute-window remaining header
    #[serde(default = "default_minute_remaining_header")]
    minute_remaining: String,
    /// Day-window capacity header
    #[serde(default = "default_day_limit_header")]
    day_limit: String,
    /// Day-window remaining header
    #[serde(default = "default_day_remaining_header")]
    day_remaining: String,
}

fn default_minute_limit_header() -> String {
    "X-BurstLimit-Limit".to_string()
}

fn default_minute_remaining_header() -> String {
    "X-BurstLimit-Remaining".to_string()
}

fn default_day_limit_header() -> String {
    "X-RateLimit-Limit".to_string()
}

fn default_day_remaining_header() -> String {
    "X-RateLimit-Remaining".to_string()
}

impl Default for QuotaHeaderNames {
    fn default() -> Self {
        Self {
            minute_limit: default_minute_limit_header(),
            minute_remaining: default_minute_remaining_header(),
            day_limit: default_day_limit_header(),
            day_remaining: default_day_remaining_header(),
        }
    }
}

/// Configuration for the dual-window rate limiter.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tollbooth_rate_limit::RateLimitConfig;
///
/// let config = RateLimitConfig::default();
/// assert_eq!(*config.requests_per_minute(), 30);
/// assert_eq!(*config.requests_per_day(), 1000);
/// assert_eq!(config.max_server_backoff(), Duration::from_secs(300));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct RateLimitConfig {
    /// Requests allowed per minute window
    #[serde(default = "default_requests_per_minute")]
    requests_per_minute: u32,

    /// Requests allowed per day window
    #[serde(default = "default_requests_per_day")]
    requests_per_day: u32,

    /// Length of the short window (seconds)
    #[serde(default = "default_minute_window")]
    minute_window_secs: u64,

    /// Length of the long window (seconds)
    #[serde(default = "default_day_window")]
    day_window_secs: u64,

    /// Upper bound on server-advised blackouts (seconds)
    #[serde(default = "default_max_server_backoff")]
    max_server_backoff_secs: u64,

    /// Quota header names
    #[serde(default)]
    #[builder(default)]
    headers: QuotaHeaderNames,
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_requests_per_day() -> u32 {
    1000
}

fn default_minute_window() -> u64 {
    60
}

fn default_day_window() -> u64 {
    86_400
}

fn default_max_server_backoff() -> u64 {
    300
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            requests_per_day: default_requests_per_day(),
            minute_window_secs: default_minute_window(),
            day_window_secs: default_day_window(),
            max_server_backoff_secs: default_max_server_backoff(),
            headers: QuotaHeaderNames::default(),
        }
    }
}

impl RateLimitConfig {
    /// Default windows with the given capacities.
    pub fn with_limits(requests_per_minute: u32, requests_per_day: u32) -> Self {
        Self {
            requests_per_minute,
            requests_per_day,
            ..Self::default()
        }
    }

    /// Short window length.
    pub fn minute_window(&self) -> Duration {
        Duration::from_secs(self.minute_window_secs)
    }

    /// Long window length.
    pub fn day_window(&self) -> Duration {
        Duration::from_secs(self.day_window_secs)
    }

    /// Cap applied to server-advised blackouts.
    pub fn max_server_backoff(&self) -> Duration {
        Duration::from_secs(self.max_server_backoff_secs)
    }
}
