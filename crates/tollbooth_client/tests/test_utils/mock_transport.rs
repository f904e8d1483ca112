//! Scripted transport for deterministic executor tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tollbooth_client::{Transport, TransportRequest, TransportResponse};
use tollbooth_error::{TollboothResult, TransportError, TransportErrorKind};

/// One scripted outcome.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum MockReply {
    /// Return this response
    Respond(TransportResponse),
    /// Fail with a connection error
    ConnectionError,
    /// Respond after a delay
    Delayed(Duration, TransportResponse),
    /// Never complete
    Hang,
}

/// Transport that replays a script, then repeats a fallback reply.
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    calls: AtomicUsize,
    requests: Mutex<Vec<TransportRequest>>,
}

#[allow(dead_code)]
impl MockTransport {
    /// Replay `script` in order, then repeat `fallback`.
    pub fn new(script: Vec<MockReply>, fallback: MockReply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer 200 with `body`.
    pub fn new_success(body: serde_json::Value) -> Self {
        Self::new(vec![], MockReply::Respond(TransportResponse::json(&body)))
    }

    /// Always answer with an empty-bodied `status`.
    pub fn new_status(status: u16) -> Self {
        Self::new(vec![], MockReply::Respond(TransportResponse::new(status)))
    }

    /// Number of round trips attempted.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &TransportRequest) -> TollboothResult<TransportResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            MockReply::Respond(response) => Ok(response),
            MockReply::ConnectionError => Err(TransportError::new(
                TransportErrorKind::Connection("connection reset by peer".to_string()),
            )
            .into()),
            MockReply::Delayed(delay, response) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            MockReply::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending never resolves")
            }
        }
    }
}
