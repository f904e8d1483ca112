//! Cache configuration and TTL classes.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a cached response stays fresh.
///
/// Named classes resolve through [`CacheConfig::ttl_for`] so deployments can
/// retune them without touching call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlClass {
    /// Volatile results such as searches (default 5 minutes)
    Short,
    /// Per-item details (default 10 minutes)
    Medium,
    /// Reference data that rarely changes (default 24 hours)
    Long,
    /// Explicit TTL; zero means the cache's default TTL
    Custom(Duration),
}

/// Configuration for the response cache.
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
pub struct CacheConfig {
    /// Whether responses are cached at all
    #[serde(default = "default_enabled")]
    enabled: bool,

    /// TTL for [`TtlClass::Short`] (seconds)
    #[serde(default = "default_short_ttl")]
    short_ttl_secs: u64,

    /// TTL for [`TtlClass::Medium`] (seconds)
    #[serde(default = "default_medium_ttl")]
    medium_ttl_secs: u64,

    /// TTL for [`TtlClass::Long`] (seconds)
    #[serde(default = "default_long_ttl")]
    long_ttl_secs: u64,

    /// Interval between background sweeps of expired entries (seconds)
    #[serde(default = "default_sweep_interval")]
    sweep_interval_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_short_ttl() -> u64 {
    300
}

fn default_medium_ttl() -> u64 {
    600
}

fn default_long_ttl() -> u64 {
    86_400
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            short_ttl_secs: default_short_ttl(),
            medium_ttl_secs: default_medium_ttl(),
            long_ttl_secs: default_long_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl CacheConfig {
    /// Configuration with caching turned off.
    pub fn disabled() -> Self {
        Self::default().with_enabled(false)
    }

    /// Resolve a TTL class to a concrete duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tollbooth_cache::{CacheConfig, TtlClass};
    ///
    /// let config = CacheConfig::default();
    /// assert_eq!(config.ttl_for(TtlClass::Short), Duration::from_secs(300));
    /// assert_eq!(config.ttl_for(TtlClass::Long), Duration::from_secs(86_400));
    /// ```
    pub fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Short => Duration::from_secs(self.short_ttl_secs),
            TtlClass::Medium => Duration::from_secs(self.medium_ttl_secs),
            TtlClass::Long => Duration::from_secs(self.long_ttl_secs),
            TtlClass::Custom(ttl) => ttl,
        }
    }

    /// Sweep interval as a duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
