use super::GenerationApi;
use crate::models::GenerationRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One scripted answer of [`MockGenerationApi`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Body(Value),
    Failure { status: u16, message: String },
}

#[derive(Clone)]
pub struct MockGenerationApi {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    gate: Option<Arc<Notify>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockGenerationApi {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn with_body(self, body: Value) -> Self {
        self.with_reply(MockReply::Body(body))
    }

    pub fn with_failure(self, status: u16, message: &str) -> Self {
        self.with_reply(MockReply::Failure {
            status,
            message: message.to_string(),
        })
    }

    /// Hold every call until the gate is notified once per call.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of calls observed running at the same time.
    pub fn get_max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockGenerationApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationApi for MockGenerationApi {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = {
            let replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                MockReply::Body(serde_json::json!({ "image": crate::inference::mock::MOCK_PNG_BASE64 }))
            } else {
                replies[index % replies.len()].clone()
            }
        };

        match reply {
            MockReply::Body(body) => Ok(body),
            MockReply::Failure { status, message } => Err(Error::Api { status, message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_api_records_requests_and_cycles_replies() {
        let api = MockGenerationApi::new()
            .with_body(json!({ "image": "AAAA" }))
            .with_failure(500, "boom");

        let request = GenerationRequest::new("a garden", "frida");
        assert_eq!(api.generate(&request).await.unwrap(), json!({ "image": "AAAA" }));
        assert!(matches!(
            api.generate(&request).await,
            Err(Error::Api { status: 500, .. })
        ));
        assert_eq!(api.get_call_count(), 2);
        assert_eq!(api.get_requests()[0], request);
        assert_eq!(api.get_max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_gate_holds_call_until_notified() {
        let gate = Arc::new(Notify::new());
        let api = MockGenerationApi::new().with_gate(gate.clone());

        let pending = {
            let api = api.clone();
            tokio::spawn(async move {
                api.generate(&GenerationRequest::new("x", "folk")).await
            })
        };

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        gate.notify_one();
        assert!(pending.await.unwrap().is_ok());
    }
}
