//! Test utilities for Tollbooth client tests.
//!
//! This module provides a scripted mock transport and request helpers.

pub mod mock_transport;

#[allow(unused_imports)]
pub use mock_transport::{MockReply, MockTransport};

use std::sync::Arc;
use tollbooth_cache::MemoryCache;
use tollbooth_client::{Client, ClientBuilder};
use tollbooth_rate_limit::RateLimiter;
use tollbooth_retry::{RetryConfig, RetryConfigBuilder};

/// Retry settings with exact, small delays.
#[allow(dead_code)]
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfigBuilder::default()
        .max_retries(max_retries)
        .initial_backoff_ms(100u64)
        .max_backoff_ms(1_000u64)
        .multiplier(2.0)
        .jitter(0.0)
        .build()
        .expect("Failed to build retry config")
}

/// Builder wired to `transport` with generous quotas and fast retries.
#[allow(dead_code)]
pub fn client_builder(transport: Arc<MockTransport>) -> ClientBuilder {
    Client::builder("test-key")
        .transport(transport)
        .rate_limiter(Arc::new(RateLimiter::new(100, 10_000)))
        .retry_config(fast_retry(3))
        .cache(Arc::new(MemoryCache::new(std::time::Duration::from_secs(300))))
}
