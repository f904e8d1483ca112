//! Tests for layered configuration loading.

use std::io::Write;
use std::time::Duration;
use tollbooth_client::{Client, TollboothConfig};

#[test]
fn test_load_bundled_defaults() {
    let config = TollboothConfig::load().unwrap();

    assert_eq!(*config.rate_limit.requests_per_minute(), 30);
    assert_eq!(*config.rate_limit.requests_per_day(), 1000);
    assert_eq!(config.rate_limit.headers().minute_remaining(), "X-BurstLimit-Remaining");
    assert_eq!(*config.retry.max_retries(), 3);
    assert_eq!(*config.cache.short_ttl_secs(), 300);
    assert_eq!(config.transport.api_key_param(), "apiKey");
    assert_eq!(config.transport.timeout(), Duration::from_secs(30));
}

#[test]
fn test_from_file_with_partial_overrides() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[rate_limit]
requests_per_minute = 5

[retry]
max_retries = 0

[cache]
enabled = false

[transport]
base_url = "https://api.example.com/v1"
errors_field = "Problems"
"#
    )
    .unwrap();

    let config = TollboothConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.rate_limit.requests_per_minute(), 5);
    assert_eq!(*config.rate_limit.requests_per_day(), 1000);
    assert_eq!(*config.retry.max_retries(), 0);
    assert_eq!(*config.retry.initial_backoff_ms(), 500);
    assert!(!*config.cache.enabled());
    assert_eq!(config.transport.base_url(), "https://api.example.com/v1");
    assert_eq!(config.transport.errors_field(), "Problems");
    assert_eq!(config.transport.api_key_param(), "apiKey");
}

#[test]
fn test_from_missing_file_fails() {
    let err = TollboothConfig::from_file("/definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("Configuration Error"));
}

#[tokio::test]
async fn test_client_from_config() {
    let mut config = TollboothConfig::default();
    assert!(Client::from_config("key", &config).is_err(), "base URL required");

    config.transport = tollbooth_client::TransportConfigBuilder::default()
        .base_url("https://api.example.com/v1")
        .timeout_secs(10u64)
        .api_key_param("apiKey")
        .errors_field("Errors")
        .build()
        .unwrap();
    let client = Client::from_config("key", &config).unwrap();

    assert_eq!(client.rate_limit_stats().minute_limit, 30);
    assert_eq!(*client.retry_config().max_retries(), 3);
    assert!(*client.cache_config().enabled());
    client.shutdown();
}
