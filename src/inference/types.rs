//! RunPod serverless payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope for `/run` and `/runsync` bodies.
#[derive(Debug, Serialize)]
pub struct RunRequest<T> {
    pub input: T,
}

/// Input for text-to-image workers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageJobInput {
    pub prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub width: u32,
    pub height: u32,
}

impl ImageJobInput {
    pub fn new(prompt: String) -> Self {
        Self {
            prompt,
            num_inference_steps: 25,
            guidance_scale: 7.5,
            width: 1024,
            height: 1024,
        }
    }
}

/// Input for ComfyUI workers.
#[derive(Debug, Serialize)]
pub struct WorkflowJobInput {
    pub workflow: Value,
}

/// Job state as reported by `/run`, `/runsync` and `/status/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl JobStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self.status.as_str(), "IN_QUEUE" | "IN_PROGRESS")
    }

    /// Job error text, if any.
    pub fn error_text(&self) -> String {
        match &self.error {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => "no error details".to_string(),
        }
    }
}

/// Body of a GraphQL request.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
}

/// GraphQL response; `errors` takes precedence over `data`.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Value>,
}
