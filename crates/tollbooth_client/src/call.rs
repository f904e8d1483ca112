//! Description of one logical API call.

use crate::TransportRequest;
use derive_getters::Getters;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use tollbooth_cache::{TtlClass, cache_key};
use tollbooth_error::{JsonContext, JsonError, TollboothResult};

/// Whether a call's response may be served from and written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Cacheable read with the given freshness class
    Cached(TtlClass),
    /// Mutating or otherwise uncacheable call
    Bypass,
}

/// A single logical call: operation name, HTTP shape and cache policy.
///
/// # Example
///
/// ```
/// use reqwest::Method;
/// use serde_json::json;
/// use tollbooth_cache::TtlClass;
/// use tollbooth_client::{CachePolicy, Call};
///
/// let call = Call::read("search", Method::POST, "/search/keyword", TtlClass::Short)
///     .with_query("version", "2")
///     .with_json_body(json!({"keyword": "lm317"}));
/// assert_eq!(*call.cache_policy(), CachePolicy::Cached(TtlClass::Short));
///
/// let update = Call::mutate("cart.update", Method::POST, "/cart");
/// assert_eq!(*update.cache_policy(), CachePolicy::Bypass);
/// ```
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Call {
    operation: String,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<JsonValue>,
    cache_policy: CachePolicy,
}

impl Call {
    fn new(
        operation: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        cache_policy: CachePolicy,
    ) -> Self {
        Self {
            operation: operation.into(),
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            cache_policy,
        }
    }

    /// Cacheable call. Reads may use any method, e.g. search endpoints taking
    /// a POST body.
    pub fn read(
        operation: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        ttl: TtlClass,
    ) -> Self {
        Self::new(operation, method, path, CachePolicy::Cached(ttl))
    }

    /// Cacheable GET.
    pub fn get(operation: impl Into<String>, path: impl Into<String>, ttl: TtlClass) -> Self {
        Self::read(operation, Method::GET, path, ttl)
    }

    /// Call that changes server state and is never cached.
    pub fn mutate(operation: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self::new(operation, method, path, CachePolicy::Bypass)
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn with_json_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize and attach a body.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if `body` cannot be serialized.
    pub fn with_body<B: Serialize + ?Sized>(self, body: &B) -> TollboothResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| JsonError::new(JsonContext::RequestBody, e))?;
        Ok(self.with_json_body(value))
    }

    /// Cache key covering everything that shapes the response.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the parameters cannot be serialized.
    pub fn cache_key(&self) -> TollboothResult<String> {
        let params = json!({
            "method": self.method.as_str(),
            "path": self.path,
            "query": self.query,
            "body": self.body,
        });
        cache_key(&self.operation, &params)
    }

    pub(crate) fn to_request(&self) -> TransportRequest {
        TransportRequest {
            method: self.method.clone(),
            path: self.path.clone(),
            query: self.query.clone(),
            body: self.body.clone(),
        }
    }
}
