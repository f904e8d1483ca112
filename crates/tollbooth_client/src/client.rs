//! High-level client assembling transport, limiter, retry policy and cache.

use crate::{Call, Executor, ReqwestTransport, TollboothConfig, Transport};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tollbooth_cache::{CacheConfig, MemoryCache, ResponseCache};
use tollbooth_core::CallContext;
use tollbooth_error::{ConfigError, TollboothResult};
use tollbooth_rate_limit::{QuotaHeaderNames, RateLimitConfig, RateLimitStats, RateLimiter};
use tollbooth_retry::RetryConfig;
use tracing::{debug, info, instrument};

/// Client for one credential against one quota-constrained API.
///
/// Clones share the limiter and the cache, so quota accounting stays correct
/// across every task using the same credential.
///
/// # Example
///
/// ```no_run
/// use serde_json::Value;
/// use tollbooth_cache::TtlClass;
/// use tollbooth_client::{Call, Client};
/// use tollbooth_core::CallContext;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder("my-api-key")
///     .base_url("https://api.example.com/v1")
///     .build()?;
///
/// let call = Call::get("manufacturers", "/manufacturers", TtlClass::Long);
/// let payload: Value = client.execute(&CallContext::new(), &call).await?;
/// println!("{}", payload);
/// client.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    executor: Executor,
}

impl Client {
    /// Start building a client for `api_key`.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Build a client entirely from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty key, missing base URL or
    /// invalid retry settings.
    pub fn from_config(api_key: impl Into<String>, config: &TollboothConfig) -> TollboothResult<Self> {
        ClientBuilder::new(api_key).config(config).build()
    }

    /// Execute a call through cache, rate limiter and retry loop.
    ///
    /// # Errors
    ///
    /// See [`Executor::execute`].
    pub async fn execute<T>(&self, ctx: &CallContext, call: &Call) -> TollboothResult<T>
    where
        T: DeserializeOwned,
    {
        self.executor.execute(ctx, call).await
    }

    /// Current rate limiter statistics.
    pub fn rate_limit_stats(&self) -> RateLimitStats {
        self.executor.limiter().stats()
    }

    /// Shared rate limiter.
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        self.executor.limiter()
    }

    /// Retry configuration in use.
    pub fn retry_config(&self) -> &RetryConfig {
        self.executor.retry_config()
    }

    /// Cache configuration in use.
    pub fn cache_config(&self) -> &CacheConfig {
        self.executor.cache_config()
    }

    /// Underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        if let Some(cache) = self.executor.cache() {
            cache.clear();
        }
    }

    /// Stop background cache sweeping. Safe to call more than once.
    #[instrument(skip(self))]
    pub fn shutdown(&self) {
        if let Some(cache) = self.executor.cache() {
            cache.close();
        }
        info!("Client shut down");
    }
}

/// Builder for [`Client`].
///
/// Anything not supplied is created from defaults: a [`ReqwestTransport`] for
/// the base URL, a [`RateLimiter`] from the rate limit settings and a
/// [`MemoryCache`] from the cache settings.
#[derive(Debug)]
pub struct ClientBuilder {
    api_key: String,
    base_url: Option<String>,
    timeout: Duration,
    api_key_param: String,
    errors_field: String,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn Transport>>,
    rate_limiter: Option<Arc<RateLimiter>>,
    rate_limit_config: RateLimitConfig,
    retry_config: RetryConfig,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_config: CacheConfig,
}

impl ClientBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        let transport = crate::TransportConfig::default();
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: transport.timeout(),
            api_key_param: transport.api_key_param().clone(),
            errors_field: transport.errors_field().clone(),
            http_client: None,
            transport: None,
            rate_limiter: None,
            rate_limit_config: RateLimitConfig::default(),
            retry_config: RetryConfig::default(),
            cache: None,
            cache_config: CacheConfig::default(),
        }
    }

    /// Apply every setting from `config`.
    pub fn config(mut self, config: &TollboothConfig) -> Self {
        let transport = &config.transport;
        if !transport.base_url().is_empty() {
            self.base_url = Some(transport.base_url().clone());
        }
        self.timeout = transport.timeout();
        self.api_key_param = transport.api_key_param().clone();
        self.errors_field = transport.errors_field().clone();
        self.rate_limit_config = config.rate_limit.clone();
        self.retry_config = config.retry.clone();
        self.cache_config = config.cache.clone();
        self
    }

    /// Base URL call paths are appended to.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Per-request timeout for the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// HTTP client for the default transport. Its own timeout applies.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the transport entirely.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Share an existing rate limiter, e.g. between clients using one key.
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Settings for the rate limiter created at build time.
    pub fn rate_limit_config(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit_config = config;
        self
    }

    /// Retry settings.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Make exactly one attempt per call.
    pub fn without_retry(mut self) -> Self {
        self.retry_config = RetryConfig::no_retry();
        self
    }

    /// Use an existing cache.
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Cache settings.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Disable response caching.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self.cache_config = CacheConfig::disabled();
        self
    }

    /// Assemble the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty API key, a missing base URL
    /// when no transport was supplied, invalid retry settings, or an HTTP
    /// client that cannot be built.
    #[instrument(skip(self))]
    pub fn build(self) -> TollboothResult<Client> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::for_key("api_key", "must not be empty").into());
        }
        self.retry_config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = self
                    .base_url
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| ConfigError::for_key("transport.base_url", "required when no transport is supplied"))?;
                let transport = match self.http_client {
                    Some(client) => ReqwestTransport::with_client(client, base_url, self.api_key),
                    None => ReqwestTransport::new(base_url, self.api_key, self.timeout)?,
                };
                Arc::new(transport.with_api_key_param(self.api_key_param))
            }
        };

        let limiter = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(RateLimiter::from_config(&self.rate_limit_config)));
        let quota_headers: QuotaHeaderNames = self.rate_limit_config.headers().clone();

        let mut executor = Executor::new(transport, limiter)
            .with_retry(self.retry_config)
            .with_quota_headers(quota_headers)
            .with_errors_field(self.errors_field);

        if *self.cache_config.enabled() {
            let cache = self
                .cache
                .unwrap_or_else(|| Arc::new(MemoryCache::from_config(&self.cache_config)));
            executor = executor.with_cache(cache, self.cache_config);
        }

        debug!(caching = executor.cache().is_some(), "Built client");
        Ok(Client { executor })
    }
}
