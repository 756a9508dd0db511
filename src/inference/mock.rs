use super::InferenceService;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Base64 of the eight-byte PNG signature.
pub const MOCK_PNG_BASE64: &str = "iVBORw0KGgo=";

#[derive(Clone)]
pub struct MockInferenceClient {
    image_responses: Arc<Mutex<Vec<Value>>>,
    video_responses: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            image_responses: Arc::new(Mutex::new(Vec::new())),
            video_responses: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_response(self, response: Value) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_video_response(self, response: String) -> Self {
        self.video_responses.lock().unwrap().push(response);
        self
    }

    /// Every call fails with an inference error carrying `message`.
    pub fn with_failure(self, message: String) -> Self {
        *self.failure.lock().unwrap() = Some(message);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Enhanced prompts received, in call order.
    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn record(&self, prompt: &str) -> Result<usize> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(Error::Inference(message.clone())),
            None => Ok(*count),
        }
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceService for MockInferenceClient {
    async fn generate_image(&self, enhanced_prompt: &str) -> Result<Value> {
        let count = self.record(enhanced_prompt)?;

        let responses = self.image_responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Value::String(MOCK_PNG_BASE64.to_string()))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }

    async fn generate_video(&self, enhanced_prompt: &str) -> Result<String> {
        let count = self.record(enhanced_prompt)?;

        let responses = self.video_responses.lock().unwrap();
        if responses.is_empty() {
            Ok("AAAAIGZ0eXBpc29t".to_string())
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_inference_default_image() {
        let client = MockInferenceClient::new();
        let image = client.generate_image("a garden").await.unwrap();
        assert_eq!(image, json!(MOCK_PNG_BASE64));
        assert_eq!(client.get_prompts(), vec!["a garden".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_inference_custom_responses_cycle() {
        let client = MockInferenceClient::new()
            .with_image_response(json!("AAAA"))
            .with_image_response(json!(["BBBB"]));

        assert_eq!(client.generate_image("1").await.unwrap(), json!("AAAA"));
        assert_eq!(client.generate_image("2").await.unwrap(), json!(["BBBB"]));
        assert_eq!(client.generate_image("3").await.unwrap(), json!("AAAA"));
        assert_eq!(client.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_inference_failure() {
        let client = MockInferenceClient::new().with_failure("worker crashed".to_string());
        let err = client.generate_video("x").await.unwrap_err();
        assert!(err.to_string().contains("worker crashed"));
        assert_eq!(client.get_call_count(), 1);
    }
}
