//! End-to-end test through the re-exported API.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tollbooth::{
    Call, CallContext, Client, MemoryCache, RateLimiter, TollboothResult, Transport,
    TransportRequest, TransportResponse, TtlClass,
};

#[derive(Debug, Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for CountingTransport {
    async fn send(&self, _request: &TransportRequest) -> TollboothResult<TransportResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TransportResponse::json(&json!({"n": n}))
            .with_header("X-RateLimit-Remaining", "41"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_through_facade() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::default());
    let client = Client::builder("key")
        .transport(transport.clone())
        .rate_limiter(Arc::new(RateLimiter::new(10, 100)))
        .cache(Arc::new(MemoryCache::new(std::time::Duration::from_secs(60))))
        .build()?;

    let ctx = CallContext::new();
    let call = Call::get("lookup", "/things/1", TtlClass::Short);

    let first: Value = client.execute(&ctx, &call).await?;
    let second: Value = client.execute(&ctx, &call).await?;
    assert_eq!(first, json!({"n": 0}));
    assert_eq!(second, first);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.rate_limit_stats().day_remaining, 41);

    client.shutdown();
    Ok(())
}
