//! The request execution protocol: cache, permit, send, classify, back off.

use crate::{CachePolicy, Call, Transport, TransportRequest, TransportResponse};
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tollbooth_cache::{CacheConfig, ResponseCache};
use tollbooth_core::CallContext;
use tollbooth_error::{ApiErrorDetail, DomainError, HttpError, JsonContext, JsonError, TollboothResult};
use tollbooth_rate_limit::{QuotaHeaderNames, QuotaSnapshot, RateLimiter};
use tollbooth_retry::{RetryConfig, parse_retry_after, should_retry};
use tracing::{debug, instrument, warn};

const DETAILS_LIMIT: usize = 512;

/// Runs calls through the cache, the rate limiter and the retry loop.
///
/// Holds no per-call state; clones share the same transport, limiter and
/// cache.
#[derive(Debug, Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    retry: RetryConfig,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_config: CacheConfig,
    quota_headers: QuotaHeaderNames,
    errors_field: String,
}

impl Executor {
    /// Executor with default retry settings and no cache.
    pub fn new(transport: Arc<dyn Transport>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            transport,
            limiter,
            retry: RetryConfig::default(),
            cache: None,
            cache_config: CacheConfig::disabled(),
            quota_headers: QuotaHeaderNames::default(),
            errors_field: "Errors".to_string(),
        }
    }

    /// Replace the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Enable caching through `cache` using the TTLs in `config`.
    ///
    /// A disabled `config` turns caching off.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>, config: CacheConfig) -> Self {
        self.cache = config.enabled().then_some(cache);
        self.cache_config = config;
        self
    }

    /// Header names carrying server quota counters.
    pub fn with_quota_headers(mut self, names: QuotaHeaderNames) -> Self {
        self.quota_headers = names;
        self
    }

    /// Top-level payload field holding the service's embedded error list.
    pub fn with_errors_field(mut self, field: impl Into<String>) -> Self {
        self.errors_field = field.into();
        self
    }

    /// Shared rate limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Active cache, if caching is enabled.
    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref()
    }

    /// Retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Cache configuration.
    pub fn cache_config(&self) -> &CacheConfig {
        &self.cache_config
    }

    /// Execute `call` and decode the response payload as `T`.
    ///
    /// Cacheable calls are answered from the cache when possible, without
    /// consuming a permit. Otherwise up to `max_retries + 1` attempts are made;
    /// every attempt first waits for a rate-limit permit. Successful payloads
    /// are checked for embedded service errors, decoded, and written through
    /// to the cache.
    ///
    /// # Errors
    ///
    /// - quota errors when the limiter refuses outright (day exhaustion)
    /// - cancellation errors when `ctx` ends at any suspension point
    /// - the last transport or HTTP error once retries are exhausted, or the
    ///   first non-retryable one
    /// - domain errors for a 2xx payload carrying service errors
    /// - JSON errors for payloads that do not decode as `T`
    #[instrument(
        skip(self, ctx, call),
        fields(operation = %call.operation(), method = %call.method(), path = %call.path())
    )]
    pub async fn execute<T>(&self, ctx: &CallContext, call: &Call) -> TollboothResult<T>
    where
        T: DeserializeOwned,
    {
        let slot = self.cache_slot(call)?;

        if let Some((cache, key, _)) = &slot
            && let Some(bytes) = cache.get(key)
        {
            match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    debug!("Serving response from cache");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(error = %e, "Discarding undecodable cache entry");
                    cache.delete(key);
                }
            }
        }

        let body = self.send_with_retry(ctx, call).await?;
        let value = self.decode::<T>(call, &body)?;

        if let Some((cache, key, ttl)) = slot {
            cache.set(&key, body, ttl);
        }
        Ok(value)
    }

    fn cache_slot(
        &self,
        call: &Call,
    ) -> TollboothResult<Option<(Arc<dyn ResponseCache>, String, Duration)>> {
        let (Some(cache), CachePolicy::Cached(class)) = (&self.cache, call.cache_policy()) else {
            return Ok(None);
        };
        let key = call.cache_key()?;
        Ok(Some((Arc::clone(cache), key, self.cache_config.ttl_for(*class))))
    }

    async fn send_with_retry(&self, ctx: &CallContext, call: &Call) -> TollboothResult<Vec<u8>> {
        let request = call.to_request();
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match self.attempt(ctx, &request).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if let Some(retry_after) = error.retry_after() {
                self.limiter.update_from_server_signal(retry_after);
            }

            if !should_retry(Some(&error), None) {
                debug!(attempt, error = %error, "Permanent error, not retrying");
                return Err(error);
            }
            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %error, "Retries exhausted");
                return Err(error);
            }

            let backoff = self.retry.compute_backoff(attempt - 1);
            warn!(attempt, max_attempts, ?backoff, error = %error, "Transient error, will retry");
            ctx.sleep(backoff).await?;
        }
    }

    async fn attempt(
        &self,
        ctx: &CallContext,
        request: &TransportRequest,
    ) -> TollboothResult<Vec<u8>> {
        self.limiter.wait(ctx).await?;

        let response = ctx.run(self.transport.send(request)).await??;
        self.limiter
            .sync_from_authoritative(QuotaSnapshot::from_headers(&response.headers, &self.quota_headers));

        if response.is_success() {
            return Ok(response.body);
        }
        Err(status_error(&response, &request.path).into())
    }

    fn decode<T>(&self, call: &Call, body: &[u8]) -> TollboothResult<T>
    where
        T: DeserializeOwned,
    {
        let payload: JsonValue = serde_json::from_slice(body)
            .map_err(|e| JsonError::new(JsonContext::Response, e))?;

        if let Some(errors) = embedded_errors(&payload, &self.errors_field) {
            warn!(count = errors.len(), "Service reported errors in successful response");
            return Err(DomainError::new(errors, call.path().as_str()).into());
        }

        serde_json::from_value(payload)
            .map_err(|e| JsonError::new(JsonContext::Response, e).into())
    }
}

fn status_error(response: &TransportResponse, endpoint: &str) -> HttpError {
    let retry_after = response
        .headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);

    let message = match response.status {
        429 => "rate limit exceeded".to_string(),
        status => StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unexpected status")
            .to_string(),
    };

    let details: String = String::from_utf8_lossy(&response.body)
        .chars()
        .take(DETAILS_LIMIT)
        .collect();

    HttpError::new(response.status, message, endpoint)
        .with_retry_after(retry_after)
        .with_details(details)
}

fn embedded_errors(payload: &JsonValue, field: &str) -> Option<Vec<ApiErrorDetail>> {
    let entries = payload.get(field)?.as_array()?;
    if entries.is_empty() {
        return None;
    }
    let details = entries
        .iter()
        .map(|entry| {
            serde_json::from_value(entry.clone()).unwrap_or_else(|_| ApiErrorDetail {
                message: entry.to_string(),
                ..ApiErrorDetail::default()
            })
        })
        .collect();
    Some(details)
}
