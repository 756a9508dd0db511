//! Saving generated images to local files.

use crate::mime;
use crate::normalize::InlineImage;
use crate::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fixed prefix of exported file names.
pub const EXPORT_PREFIX: &str = "mexican-art-";
/// Fixed prefix of files written by the command-line tool.
pub const CLI_PREFIX: &str = "mexican_art_";
const SAFE_PROMPT_LEN: usize = 30;

/// `mexican-art-<unix millis>.<ext>`
pub fn export_file_name(extension: &str, at: DateTime<Utc>) -> String {
    format!("{}{}.{}", EXPORT_PREFIX, at.timestamp_millis(), extension)
}

/// `mexican_art_<safe prompt>_<YYYYmmdd_HHMMSS>.<ext>`
///
/// The prompt keeps alphanumerics, spaces, `-` and `_`, cut to 30 characters.
pub fn prompt_file_name(prompt: &str, extension: &str, at: NaiveDateTime) -> String {
    let safe: String = prompt
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(SAFE_PROMPT_LEN)
        .collect();
    format!(
        "{}{}_{}.{}",
        CLI_PREFIX,
        safe,
        at.format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Decode `image` and write it under `dir` with a timestamped name.
///
/// Does nothing and returns `None` without an image.
pub fn export_image(
    image: Option<&InlineImage>,
    dir: &Path,
    at: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
    let Some(image) = image else {
        debug!("No image to export");
        return Ok(None);
    };

    let bytes = image.decode()?;
    let extension = mime::extension_for(image.media_type(), &bytes);
    let path = dir.join(export_file_name(extension, at));
    fs::write(&path, &bytes)?;

    info!("Saved image ({} bytes) to {}", bytes.len(), path.display());
    Ok(Some(path))
}
