//! Client side of the generation endpoint
//!
//! The front-end controller talks to the proxy through [`GenerationApi`].
//! [`GenerateClient`] is the HTTP implementation, [`MockGenerationApi`] the
//! scripted one used in tests.

pub mod client;
pub mod mock;

pub use client::GenerateClient;
pub use mock::{MockGenerationApi, MockReply};

use crate::models::GenerationRequest;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Issue one generation call and return the raw JSON success body.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value>;
}
