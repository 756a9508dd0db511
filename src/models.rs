//! Data models and configuration
//!
//! Wire types shared by the proxy, its HTTP client and the CLI, plus the
//! environment-driven configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Body of `POST /api/generate` and `POST /api/generate-video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_style_id")]
    pub style: String,
}

fn default_style_id() -> String {
    crate::styles::Style::default_style().id.to_string()
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: style.into(),
        }
    }
}

/// Proxy success body for image generation.
///
/// `image` is passed on exactly as the inference backend produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub image: serde_json::Value,
    pub prompt: String,
    pub enhanced_prompt: String,
    pub style: String,
}

/// Proxy success body for video generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResponse {
    pub video: String,
    pub prompt: String,
    pub enhanced_prompt: String,
    pub style: String,
}

/// Failure body. `error` is optional on the consuming side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const DEFAULT_RUNPOD_BASE_URL: &str = "https://api.runpod.ai";
pub const DEFAULT_RUNPOD_GRAPHQL_URL: &str = "https://api.runpod.io/graphql";
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_GENERATE_URL: &str = "http://127.0.0.1:3000/api/generate";

/// Backend configuration for the proxy, CLI and admin tool.
#[derive(Debug, Clone)]
pub struct Config {
    pub runpod_api_key: String,
    pub runpod_endpoint_id: String,
    pub runpod_video_endpoint_id: Option<String>,
    pub runpod_base_url: String,
    pub runpod_graphql_url: String,
    pub server_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Values are trimmed and empty
    /// values count as unset. Missing credentials are reported as
    /// [`Error::MissingEnv`](crate::Error::MissingEnv) before anything else
    /// is checked.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| trimmed(&lookup, key);
        let required = |key: &str| {
            get(key).ok_or_else(|| crate::Error::MissingEnv(key.to_string()))
        };

        let runpod_api_key = required("RUNPOD_API_KEY")?;
        let runpod_endpoint_id = required("RUNPOD_ENDPOINT_ID")?;

        Ok(Self {
            runpod_api_key,
            runpod_endpoint_id,
            runpod_video_endpoint_id: get("RUNPOD_VIDEO_ENDPOINT_ID"),
            runpod_base_url: get("RUNPOD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_RUNPOD_BASE_URL.to_string()),
            runpod_graphql_url: get("RUNPOD_GRAPHQL_URL")
                .unwrap_or_else(|| DEFAULT_RUNPOD_GRAPHQL_URL.to_string()),
            server_addr: server_addr_from_lookup(&lookup)?,
        })
    }

    /// Endpoint used for video jobs.
    pub fn video_endpoint_id(&self) -> &str {
        self.runpod_video_endpoint_id
            .as_deref()
            .unwrap_or(&self.runpod_endpoint_id)
    }
}

fn trimmed<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Proxy listen address from `ART_SERVER_ADDR`, defaulting to
/// [`DEFAULT_SERVER_ADDR`]. Needs no credentials.
pub fn server_addr_from_lookup<F>(lookup: &F) -> crate::Result<SocketAddr>
where
    F: Fn(&str) -> Option<String>,
{
    trimmed(lookup, "ART_SERVER_ADDR")
        .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string())
        .parse::<SocketAddr>()
        .map_err(|e| crate::Error::Config(format!("Invalid ART_SERVER_ADDR: {}", e)))
}

pub fn server_addr_from_env() -> crate::Result<SocketAddr> {
    dotenvy::dotenv().ok();
    server_addr_from_lookup(&|key: &str| std::env::var(key).ok())
}

/// Front-end configuration. Holds no secrets.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub generate_url: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            generate_url: std::env::var("ART_GENERATE_URL")
                .unwrap_or_else(|_| DEFAULT_GENERATE_URL.to_string()),
        }
    }
}
