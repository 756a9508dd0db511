//! Pulling media out of finished job output.

use crate::{Error, Result};
use serde_json::Value;

/// Shortest string value accepted as a video payload when the worker does
/// not use a known key.
const MIN_VIDEO_PAYLOAD_LEN: usize = 100;

/// The image value of a text-to-image job: `output.image` or a bare string
/// output. The value is returned untouched; clients normalize it.
pub fn extract_image(output: &Value) -> Result<Value> {
    match output {
        Value::Object(fields) if fields.contains_key("image") => Ok(fields["image"].clone()),
        Value::String(_) => Ok(output.clone()),
        other => Err(Error::UnexpectedOutput(format!(
            "Unexpected response from AI: {}",
            other
        ))),
    }
}

/// The video payload of an AnimateDiff job.
pub fn extract_video(output: &Value) -> Result<String> {
    let found = match output {
        Value::String(_) => Some(output),
        Value::Object(fields) => fields
            .get("video")
            .or_else(|| fields.get("message"))
            .or_else(|| {
                fields.values().find(|value| {
                    value
                        .as_str()
                        .is_some_and(|text| text.len() > MIN_VIDEO_PAYLOAD_LEN)
                })
            }),
        _ => None,
    };

    let found = match found {
        Some(Value::Object(nested)) => nested.get("data").or_else(|| nested.get("video")),
        other => other,
    };

    match found {
        Some(Value::String(video)) if !video.is_empty() => Ok(video.clone()),
        _ => {
            let dump: String = output.to_string().chars().take(1000).collect();
            Err(Error::UnexpectedOutput(format!(
                "No video in response. Response: {}",
                dump
            )))
        }
    }
}
