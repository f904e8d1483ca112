//! Tests for the TTL response cache.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tollbooth_cache::{CacheConfig, CacheConfigBuilder, MemoryCache, ResponseCache, TtlClass, cache_key};

#[tokio::test(start_paused = true)]
async fn test_set_then_get() {
    let cache = MemoryCache::new(Duration::from_secs(300));
    cache.set("k", b"value".to_vec(), Duration::from_secs(60));
    assert_eq!(cache.get("k"), Some(b"value".to_vec()));
    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache = MemoryCache::new(Duration::from_secs(300));
    cache.set("k", b"value".to_vec(), Duration::from_secs(10));

    tokio::time::advance(Duration::from_secs(10)).await;
    assert!(cache.get("k").is_some(), "expiry is strictly after the TTL");

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(cache.get("k").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_uses_default() {
    let cache = MemoryCache::new(Duration::from_secs(30));
    cache.set("k", b"value".to_vec(), Duration::ZERO);

    tokio::time::advance(Duration::from_secs(29)).await;
    assert!(cache.get("k").is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(cache.get("k").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_overwrite_keeps_latest() {
    let cache = MemoryCache::new(Duration::from_secs(300));
    cache.set("k", b"first".to_vec(), Duration::ZERO);
    cache.set("k", b"second".to_vec(), Duration::ZERO);
    assert_eq!(cache.get("k"), Some(b"second".to_vec()));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_delete_and_clear() {
    let cache = MemoryCache::new(Duration::from_secs(300));
    cache.set("a", b"1".to_vec(), Duration::ZERO);
    cache.set("b", b"2".to_vec(), Duration::ZERO);

    cache.delete("a");
    cache.delete("missing");
    assert!(cache.get("a").is_none());
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_removes_expired_entries() {
    let cache = MemoryCache::with_sweep_interval(Duration::from_secs(300), Duration::from_secs(60));
    cache.set("short", b"1".to_vec(), Duration::from_secs(5));
    cache.set("long", b"2".to_vec(), Duration::from_secs(600));
    assert_eq!(cache.len(), 2);

    // Let the sweep tick at 60s run before checking.
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(cache.len(), 1);
    assert!(cache.get("long").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_close_is_idempotent_and_stops_sweeping() {
    let cache = MemoryCache::new(Duration::from_secs(300));
    assert!(cache.is_sweeping());

    cache.close();
    cache.close();
    assert!(!cache.is_sweeping());

    cache.set("k", b"1".to_vec(), Duration::from_secs(1));
    tokio::time::sleep(Duration::from_secs(120)).await;
    // Not swept, but still hidden from readers.
    assert_eq!(cache.len(), 1);
    assert!(cache.get("k").is_none());
    assert_eq!(cache.cleanup_expired(), 1);
}

#[test]
fn test_cache_without_runtime() {
    let cache = MemoryCache::new(Duration::from_secs(300));
    assert!(!cache.is_sweeping());
    cache.set("k", b"1".to_vec(), Duration::ZERO);
    assert!(cache.get("k").is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access() {
    let cache = Arc::new(MemoryCache::new(Duration::from_secs(300)));
    let mut handles = Vec::new();

    for i in 0..16 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            for j in 0..100 {
                let key = format!("key-{}", j % 10);
                cache.set(&key, format!("{}-{}", i, j).into_bytes(), Duration::ZERO);
                let _ = cache.get(&key);
                if j % 25 == 0 {
                    cache.delete(&key);
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert!(cache.len() <= 10);
}

#[test]
fn test_cache_key_is_deterministic() {
    let a = cache_key("search", &json!({"keyword": "lm317", "opts": {"b": 1, "a": 2}})).unwrap();
    let b = cache_key("search", &json!({"opts": {"a": 2, "b": 1}, "keyword": "lm317"})).unwrap();
    assert_eq!(a, b);

    let other_op = cache_key("details", &json!({"keyword": "lm317", "opts": {"b": 1, "a": 2}})).unwrap();
    assert_ne!(a, other_op);

    let other_params = cache_key("search", &json!({"keyword": "lm318"})).unwrap();
    assert_ne!(a, other_params);

    let digest = a.strip_prefix("search:").unwrap();
    assert_eq!(digest.len(), 64);
}

#[test]
fn test_ttl_classes() {
    let config = CacheConfig::default();
    assert!(*config.enabled());
    assert_eq!(config.ttl_for(TtlClass::Short), Duration::from_secs(300));
    assert_eq!(config.ttl_for(TtlClass::Medium), Duration::from_secs(600));
    assert_eq!(config.ttl_for(TtlClass::Long), Duration::from_secs(86_400));
    assert_eq!(
        config.ttl_for(TtlClass::Custom(Duration::from_secs(7))),
        Duration::from_secs(7)
    );
    assert!(!*CacheConfig::disabled().enabled());
}

#[test]
fn test_config_builder_and_serde_defaults() {
    let config = CacheConfigBuilder::default()
        .enabled(true)
        .short_ttl_secs(10)
        .medium_ttl_secs(20)
        .long_ttl_secs(30)
        .sweep_interval_secs(5)
        .build()
        .unwrap();
    assert_eq!(config.sweep_interval(), Duration::from_secs(5));

    let parsed: CacheConfig = serde_json::from_str(r#"{"short_ttl_secs": 42}"#).unwrap();
    assert_eq!(*parsed.short_ttl_secs(), 42);
    assert_eq!(*parsed.long_ttl_secs(), 86_400);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_ttl_never_expires() {
    let cache = MemoryCache::new(Duration::from_secs(300));
    cache.set("k", b"value".to_vec(), Duration::MAX);

    tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
    assert_eq!(cache.get("k"), Some(b"value".to_vec()));
    assert_eq!(cache.cleanup_expired(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_sweep_interval() {
    let cache = MemoryCache::with_sweep_interval(Duration::from_secs(5), Duration::MAX);
    assert!(cache.is_sweeping());
    cache.set("k", b"value".to_vec(), Duration::ZERO);

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(cache.get("k").is_none());
    cache.close();
}
