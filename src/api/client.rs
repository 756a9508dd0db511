use super::GenerationApi;
use crate::models::{ClientConfig, ErrorBody, GenerationRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// HTTP client for `POST /api/generate`.
///
/// No timeout is set here; the proxy bounds the job on its side.
pub struct GenerateClient {
    client: Client,
    url: String,
}

impl GenerateClient {
    pub fn new(url: String) -> Self {
        Self::new_with_client(url, Client::new())
    }

    pub fn new_with_client(url: String, client: Client) -> Self {
        Self { client, url }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.generate_url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Failure message for a non-success response body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Failed to generate art (status {})", status.as_u16()))
}

#[async_trait]
impl GenerationApi for GenerateClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        tracing::debug!("Sending generation request (style {})", request.style);

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach generation endpoint: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::warn!("Generation failed (status {}): {}", status, message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse generation response: {}", e);
            Error::Serialization(e)
        })
    }
}
