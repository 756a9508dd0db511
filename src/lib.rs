//! Art Machine - AI art in Mexican art styles
//!
//! A user picks a style, describes a picture, and a RunPod-hosted model
//! paints it. The crate holds the front-end controller and response
//! normalization, the proxy that keeps credentials server-side, and the
//! command-line generator.

pub mod api;
pub mod app;
pub mod controller;
pub mod error;
pub mod export;
pub mod inference;
pub mod mime;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod server;
pub mod styles;

pub use error::{Error, Result};
