//! Error handling and custom error types
//!
//! Provides unified error handling across the library using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A required environment variable is absent or blank.
    #[error("{0} not set")]
    MissingEnv(String),

    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("A generation request is already in progress")]
    Busy,

    #[error("Unknown style '{0}'")]
    UnknownStyle(String),

    /// Non-success response from the generation endpoint. `message` is the
    /// body's `error` field when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The success body held no resolvable image; carries the JSON type found.
    #[error("Unexpected image format: {0}")]
    UnexpectedImageFormat(String),

    #[error("Inference error: {0}")]
    Inference(String),

    /// A finished job whose output holds no usable media.
    #[error("{0}")]
    UnexpectedOutput(String),

    /// Job still queued or running; only used to drive status polling.
    #[error("Job {id} is {status}")]
    JobPending { id: String, status: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
