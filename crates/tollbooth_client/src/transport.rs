//! The network seam: one request in, one response out.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value as JsonValue;
use std::fmt::Debug;
use std::time::Duration;
use tollbooth_error::{ConfigError, TollboothResult, TransportError, TransportErrorKind};
use tracing::{debug, instrument};

/// A fully described request, relative to the transport's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Path appended to the base URL, starting with `/`
    pub path: String,
    /// Query parameters in order
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<JsonValue>,
}

/// Raw response as received from the network.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response with the given status and no headers or body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// 200 response with a JSON body.
    pub fn json(body: &JsonValue) -> Self {
        Self::new(200).with_body(body.to_string())
    }

    /// Replace the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations attach authentication and map network failures to
/// [`TransportError`]s; they never retry. Non-2xx statuses are returned as
/// responses, not errors.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Perform a single round trip.
    async fn send(&self, request: &TransportRequest) -> TollboothResult<TransportResponse>;
}

/// [`Transport`] over a `reqwest` client, authenticating with a query parameter.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_key_param: String,
}

impl ReqwestTransport {
    /// Build a transport with its own HTTP client and request timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> TollboothResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Build a transport around an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_key_param: "apiKey".to_string(),
        }
    }

    /// Query parameter carrying the API key.
    pub fn with_api_key_param(mut self, param: impl Into<String>) -> Self {
        self.api_key_param = param.into();
        self
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &TransportRequest) -> TollboothResult<Url> {
        let raw = format!("{}{}", self.base_url.trim_end_matches('/'), request.path);
        let mut url = Url::parse(&raw).map_err(|e| {
            TransportError::new(TransportErrorKind::InvalidUrl(format!("{}: {}", raw, e)))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(&self.api_key_param, &self.api_key);
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    // Drop the URL so the API key never reaches logs.
    let err = err.without_url();
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        TransportErrorKind::Connection(err.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body(err.to_string())
    } else {
        TransportErrorKind::Request(err.to_string())
    };
    TransportError::new(kind)
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: &TransportRequest) -> TollboothResult<TransportResponse> {
        let url = self.url_for(request)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        debug!(status, bytes = body.len(), "Received response");
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
