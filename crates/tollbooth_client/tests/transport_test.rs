//! Tests for the reqwest transport against a local mock server.

use reqwest::Method;
use serde_json::{Value, json};
use std::time::Duration;
use tollbooth_cache::TtlClass;
use tollbooth_client::{Call, Client, ReqwestTransport, Transport, TransportRequest};
use tollbooth_core::CallContext;
use tollbooth_error::{ErrorCategory, TollboothErrorKind, TransportErrorKind};
use tollbooth_retry::RetryConfigBuilder;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(method: Method, path: &str) -> TransportRequest {
    TransportRequest {
        method,
        path: path.to_string(),
        query: Vec::new(),
        body: None,
    }
}

#[tokio::test]
async fn test_get_attaches_api_key_and_query() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/part"))
        .and(query_param("apiKey", "secret"))
        .and(query_param("partNumber", "595-LM317"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"part": "LM317"}))
                .insert_header("X-BurstLimit-Remaining", "29"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport =
        ReqwestTransport::new(format!("{}/v1/", server.uri()), "secret", Duration::from_secs(5))?;
    let mut req = request(Method::GET, "/part");
    req.query.push(("partNumber".into(), "595-LM317".into()));

    let response = transport.send(&req).await?;
    assert_eq!(response.status, 200);
    assert_eq!(
        response.headers.get("x-burstlimit-remaining").unwrap(),
        "29"
    );
    let body: Value = serde_json::from_slice(&response.body)?;
    assert_eq!(body["part"], "LM317");
    Ok(())
}

#[tokio::test]
async fn test_post_sends_json_body() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(query_param("key", "secret"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"keyword": "lm317"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(server.uri(), "secret", Duration::from_secs(5))?
        .with_api_key_param("key");
    let mut req = request(Method::POST, "/search");
    req.body = Some(json!({"keyword": "lm317"}));

    let response = transport.send(&req).await?;
    assert!(response.is_success());
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_a_response() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(server.uri(), "secret", Duration::from_secs(5))?;
    let response = transport.send(&request(Method::GET, "/anything")).await?;
    assert_eq!(response.status, 503);
    assert!(!response.is_success());
    Ok(())
}

#[tokio::test]
async fn test_timeout_maps_to_retryable_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(server.uri(), "secret", Duration::from_millis(100))?;
    let err = transport
        .send(&request(Method::GET, "/slow"))
        .await
        .unwrap_err();

    match err.kind() {
        TollboothErrorKind::Transport(t) => {
            assert!(matches!(t.kind, TransportErrorKind::Timeout(_)));
            assert!(!t.to_string().contains("secret"));
        }
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_invalid_base_url() -> anyhow::Result<()> {
    let transport = ReqwestTransport::new("not a url", "secret", Duration::from_secs(1))?;
    let err = transport
        .send(&request(Method::GET, "/x"))
        .await
        .unwrap_err();
    match err.kind() {
        TollboothErrorKind::Transport(t) => {
            assert!(matches!(t.kind, TransportErrorKind::InvalidUrl(_)))
        }
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_client_retries_against_server() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/keyword"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search/keyword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Errors": [], "Count": 4})))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryConfigBuilder::default()
        .max_retries(3u32)
        .initial_backoff_ms(10u64)
        .max_backoff_ms(50u64)
        .multiplier(2.0)
        .jitter(0.0)
        .build()?;
    let client = Client::builder("secret")
        .base_url(server.uri())
        .retry_config(retry)
        .build()?;

    let call = Call::read("search", Method::POST, "/search/keyword", TtlClass::Short)
        .with_json_body(json!({"keyword": "lm317"}));
    let value: Value = client.execute(&CallContext::new(), &call).await?;
    assert_eq!(value["Count"], 4);

    // Served from cache, no further requests.
    let again: Value = client.execute(&CallContext::new(), &call).await?;
    assert_eq!(again, value);

    client.shutdown();
    Ok(())
}

#[tokio::test]
async fn test_client_reports_unauthorized() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder("wrong").base_url(server.uri()).build()?;
    let err = client
        .execute::<Value>(&CallContext::new(), &Call::get("details", "/part/1", TtlClass::Medium))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Protocol);
    match err.kind() {
        TollboothErrorKind::Http(http) => {
            assert_eq!(http.status_code, 401);
            assert_eq!(http.details, "invalid key");
        }
        other => panic!("unexpected error: {}", other),
    }
    Ok(())
}
