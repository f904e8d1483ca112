//! Retry configuration and backoff computation.

use derive_getters::Getters;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tollbooth_error::{ConfigError, TollboothResult};
use tracing::trace;

/// Retry behaviour for one executor.
///
/// Backoff for retry `attempt` (zero-based) is
/// `initial_backoff * multiplier^attempt`, perturbed by up to `jitter` of
/// itself in either direction and clamped to `[0, max_backoff]`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tollbooth_retry::RetryConfig;
///
/// let config = RetryConfig::default();
/// assert_eq!(*config.max_retries(), 3);
/// assert_eq!(config.max_attempts(), 4);
/// assert_eq!(RetryConfig::no_retry().max_attempts(), 1);
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
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    max_retries: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(default = "default_initial_backoff")]
    initial_backoff_ms: u64,

    /// Upper bound on any single delay (milliseconds)
    #[serde(default = "default_max_backoff")]
    max_backoff_ms: u64,

    /// Growth factor between consecutive delays
    #[serde(default = "default_multiplier")]
    multiplier: f64,

    /// Symmetric random perturbation as a fraction of the delay
    #[serde(default = "default_jitter")]
    jitter: f64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self::default().with_max_retries(0)
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the first retry.
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Upper bound on any single delay.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a multiplier below 1, a jitter
    /// outside `[0, 1]`, or an initial backoff above the maximum.
    pub fn validate(&self) -> TollboothResult<()> {
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            return Err(ConfigError::for_key("retry.multiplier", format!(
                "must be at least 1.0, got {}",
                self.multiplier
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ConfigError::for_key("retry.jitter", format!(
                "must be between 0.0 and 1.0, got {}",
                self.jitter
            ))
            .into());
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::for_key("retry.initial_backoff_ms", format!(
                "initial backoff ({}ms) exceeds max backoff ({}ms)",
                self.initial_backoff_ms, self.max_backoff_ms
            ))
            .into());
        }
        Ok(())
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn compute_backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let max = self.max_backoff_ms as f64;
        let mut delay = self.initial_backoff_ms as f64 * self.multiplier.powi(exponent);
        if delay.is_nan() {
            // 0 * inf
            delay = 0.0;
        }

        if self.jitter > 0.0 && delay.is_finite() {
            let factor: f64 = rand::thread_rng().gen_range(-1.0..=1.0);
            delay += delay * self.jitter * factor;
        }

        let clamped = delay.min(max).max(0.0);
        let backoff = Duration::from_nanos((clamped * 1_000_000.0).round() as u64);
        trace!(attempt, ?backoff, "Computed retry backoff");
        backoff
    }
}
