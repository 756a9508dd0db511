//! Generation proxy
//!
//! Keeps the RunPod credentials server-side. The browser (or any
//! [`GenerationApi`](crate::api::GenerationApi) client) posts
//! `{prompt, style}` and gets the worker's image value back.

use crate::inference::InferenceService;
use crate::models::{ErrorBody, GenerationRequest, GenerationResponse, VideoResponse};
use crate::styles::Style;
use crate::Error;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

pub const CONFIG_ERROR: &str = "Server configuration error. Please contact Maia!";
pub const VIDEO_CONFIG_ERROR: &str = "Video generation not configured yet! Coming soon!";
pub const INVALID_REQUEST: &str = "Invalid request format";
pub const MISSING_PROMPT: &str = "Please provide a prompt!";

/// Shared handler state. `inference` is `None` when credentials are missing;
/// the server still starts and answers with a configuration error.
#[derive(Clone, Default)]
pub struct ServerState {
    inference: Option<Arc<dyn InferenceService>>,
}

impl ServerState {
    pub fn new(inference: Arc<dyn InferenceService>) -> Self {
        Self {
            inference: Some(inference),
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.inference.is_some()
    }
}

/// JSON error reply: `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    fn from_inference(err: Error, what: &str) -> Self {
        match err {
            Error::UnexpectedOutput(message) => Self::internal(message),
            other => Self::internal(format!("Error generating {}: {}", what, other)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Parse the body and trim the prompt; empty prompts are rejected.
fn parse_request(body: &[u8]) -> Result<GenerationRequest, ApiError> {
    let mut request: GenerationRequest = serde_json::from_slice(body).map_err(|e| {
        warn!("Rejecting malformed request body: {}", e);
        ApiError::bad_request(INVALID_REQUEST)
    })?;

    request.prompt = request.prompt.trim().to_string();
    if request.prompt.is_empty() {
        return Err(ApiError::bad_request(MISSING_PROMPT));
    }
    Ok(request)
}

async fn generate(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<GenerationResponse>, ApiError> {
    let request = parse_request(&body)?;
    let inference = state.inference.as_ref().ok_or_else(|| {
        error!("RunPod credentials are not configured");
        ApiError::internal(CONFIG_ERROR)
    })?;

    let style = Style::find_or_default(&request.style);
    let enhanced_prompt = style.enhance_prompt(&request.prompt);
    info!("Generating art in style '{}'", style.id);

    let image = inference
        .generate_image(&enhanced_prompt)
        .await
        .map_err(|e| {
            error!("Art generation failed: {}", e);
            ApiError::from_inference(e, "art")
        })?;

    Ok(Json(GenerationResponse {
        image,
        prompt: request.prompt,
        enhanced_prompt,
        style: request.style,
    }))
}

async fn generate_video(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<VideoResponse>, ApiError> {
    let request = parse_request(&body)?;
    let inference = state
        .inference
        .as_ref()
        .ok_or_else(|| ApiError::internal(VIDEO_CONFIG_ERROR))?;

    let style = Style::find_or_default(&request.style);
    let enhanced_prompt = style.enhance_video_prompt(&request.prompt);
    info!("Generating video in style '{}'", style.id);

    let video = inference
        .generate_video(&enhanced_prompt)
        .await
        .map_err(|e| {
            error!("Video generation failed: {}", e);
            ApiError::from_inference(e, "video")
        })?;

    Ok(Json(VideoResponse {
        video,
        prompt: request.prompt,
        enhanced_prompt,
        style: request.style,
    }))
}

pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/generate-video", post(generate_video))
        .route("/health", get(|| async { "ok" }))
        .layer(cors)
        .with_state(state)
}

/// Serve on an already bound listener until the task is cancelled.
pub async fn serve_on(listener: TcpListener, state: ServerState) -> crate::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Art server listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn serve(addr: SocketAddr, state: ServerState) -> crate::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, state).await
}
