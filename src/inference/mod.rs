//! Inference backend integration
//!
//! Runs text-to-image and text-to-video jobs on RunPod serverless endpoints.
//! The proxy and CLI depend on [`InferenceService`] so tests can swap in
//! [`MockInferenceClient`].

pub mod mock;
pub mod output;
pub mod runpod;
pub mod types;
pub mod workflow;

pub use mock::MockInferenceClient;
pub use runpod::RunPodClient;

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Run a text-to-image job and return its image value as produced by the
    /// worker (string, list or wrapper object).
    async fn generate_image(&self, enhanced_prompt: &str) -> Result<Value>;

    /// Run a text-to-video job and return the encoded clip.
    async fn generate_video(&self, enhanced_prompt: &str) -> Result<String>;
}
