//! Response caching with TTL support.
//!
//! This crate provides the cache consulted by the request executor before it
//! spends a rate-limit permit:
//! - [`ResponseCache`] is the storage seam, [`MemoryCache`] the default store
//! - [`cache_key`] derives deterministic keys from operation parameters
//! - [`CacheConfig`] and [`TtlClass`] map call kinds to freshness windows

#![warn(missing_docs)]

mod cache;
mod config;
mod key;

pub use cache::{CacheEntry, MemoryCache, ResponseCache};
pub use config::{CacheConfig, CacheConfigBuilder, TtlClass};
pub use key::cache_key;
