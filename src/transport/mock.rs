//! In-memory transport for tests

use super::{ApiRequest, Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

type Reply = Result<Value, TransportError>;

/// Records every call and answers from canned replies
///
/// Replies are keyed by `ApiRequest::target()` (`path?query`). A gated target
/// suspends the call until the test releases it, which lets tests decide the
/// order in which concurrent responses arrive.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `target` with `value` (repeatable)
    pub fn reply(&self, target: &str, value: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert(target.to_string(), Ok(value));
    }

    /// Fail `target` with `err` (repeatable)
    pub fn fail(&self, target: &str, err: TransportError) {
        self.replies
            .lock()
            .unwrap()
            .insert(target.to_string(), Err(err));
    }

    /// Hold the next call to `target` until the returned sender fires
    pub fn gate(&self, target: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(target.to_string(), rx);
        tx
    }

    /// Targets of all calls so far, in call order
    pub fn targets(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(ApiRequest::target)
            .collect()
    }

    /// Number of calls whose path equals `path`
    pub fn count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let target = request.target();
        self.calls.lock().unwrap().push(request);

        let gate = self.gates.lock().unwrap().remove(&target);
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".to_string())));
        }

        self.replies
            .lock()
            .unwrap()
            .get(&target)
            .cloned()
            .unwrap_or_else(|| Ok(serde_json::json!({ "items": [] })))
    }

    fn session_cookie(&self) -> Option<String> {
        Some("session_token=test".to_string())
    }
}
