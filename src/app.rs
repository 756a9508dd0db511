//! Command-line generation: one prompt in, one image file out.

use crate::export;
use crate::inference::{InferenceService, RunPodClient};
use crate::mime;
use crate::models::Config;
use crate::normalize::resolve_image;
use crate::styles::Style;
use crate::{Error, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Generates one image and writes it into `output_dir`.
pub struct App {
    inference: Box<dyn InferenceService>,
    output_dir: PathBuf,
}

impl App {
    /// Build an app from an injected inference service.
    pub fn with_services(inference: Box<dyn InferenceService>, output_dir: PathBuf) -> Self {
        Self {
            inference,
            output_dir,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        let config = Config::from_env()?;
        info!("Using RunPod endpoint {}", config.runpod_endpoint_id);
        Ok(Self::with_services(
            Box::new(RunPodClient::from_config(&config)),
            output_dir,
        ))
    }

    /// Resolve a style id, warning and falling back to the default.
    pub fn resolve_style(style_id: &str) -> &'static Style {
        Style::find(style_id).unwrap_or_else(|| {
            let fallback = Style::default_style();
            warn!("Unknown style '{}'. Using '{}' instead.", style_id, fallback.id);
            fallback
        })
    }

    /// Generate art for `prompt` and return the written file.
    pub async fn run(&self, prompt: &str, style_id: &str) -> Result<PathBuf> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::Validation("Please provide a prompt!".to_string()));
        }

        let style = Self::resolve_style(style_id);
        let enhanced_prompt = style.enhance_prompt(prompt);
        info!("Creating art with prompt: '{}'", prompt);
        info!("Style: {}", style.name);
        info!("Enhanced prompt: '{}'", enhanced_prompt);

        let payload = self.inference.generate_image(&enhanced_prompt).await?;
        let image = resolve_image(&payload)?;
        let bytes = image.decode()?;
        info!("Art generated ({} bytes)", bytes.len());

        let extension = mime::extension_for(image.media_type(), &bytes);
        let file_name = export::prompt_file_name(prompt, extension, Local::now().naive_local());
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        fs::write(&path, &bytes)?;

        info!("Image saved to: {}", path.display());
        Ok(path)
    }
}
