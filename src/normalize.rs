//! Response normalization
//!
//! The generation endpoint may hand back its image as a bare string, a list
//! whose first element is the image, or an object wrapping it under `image`
//! or `data`. [`resolve_image`] walks those shapes down to a string and
//! returns it as an [`InlineImage`].

use crate::{Error, Result};
use base64::Engine as _;
use serde_json::{Map, Value};
use std::fmt;

pub const DATA_URI_SCHEME: &str = "data:";
pub const PNG_DATA_PREFIX: &str = "data:image/png;base64,";

/// A self-describing `data:` image reference, usable directly as an image
/// source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    uri: String,
}

impl InlineImage {
    /// Wrap a string. Strings that already carry a `data:` prefix are kept
    /// verbatim, anything else is taken as raw base64 PNG.
    pub fn from_text(text: &str) -> Self {
        let uri = if text.starts_with(DATA_URI_SCHEME) {
            text.to_string()
        } else {
            format!("{}{}", PNG_DATA_PREFIX, text)
        };
        Self { uri }
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn into_string(self) -> String {
        self.uri
    }

    /// Declared media type, e.g. `image/png`. `None` when the header is empty.
    pub fn media_type(&self) -> Option<&str> {
        let header = self.header();
        let media = header.split(';').next().unwrap_or_default();
        (!media.is_empty()).then_some(media)
    }

    /// Decode the payload to raw bytes. Only base64 payloads are supported.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (header, payload) = self.split()?;
        if !header.split(';').any(|param| param == "base64") {
            return Err(Error::Decode(format!(
                "inline image is not base64 encoded (header '{}')",
                header
            )));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::Decode(format!("Failed to decode base64 image: {}", e)))
    }

    fn header(&self) -> &str {
        self.split().map(|(header, _)| header).unwrap_or_default()
    }

    fn split(&self) -> Result<(&str, &str)> {
        self.uri
            .strip_prefix(DATA_URI_SCHEME)
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| Error::Decode("inline image has no payload separator".to_string()))
    }
}

impl fmt::Display for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// One decoding step over a JSON value.
#[derive(Debug)]
enum ImageShape<'a> {
    Text(&'a str),
    Sequence(&'a [Value]),
    Wrapper(&'a Map<String, Value>),
    Unrecognized(&'a Value),
}

impl<'a> From<&'a Value> for ImageShape<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(text) => ImageShape::Text(text),
            Value::Array(items) => ImageShape::Sequence(items),
            Value::Object(fields) => ImageShape::Wrapper(fields),
            other => ImageShape::Unrecognized(other),
        }
    }
}

/// JSON type name used in error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Null and blank strings count as absent when picking a wrapper field.
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// `image` when it holds something, else `data`. When neither does, the
/// field that is present is returned so the error names its shape.
fn wrapped_field(fields: &Map<String, Value>) -> Option<&Value> {
    let image = fields.get("image");
    let data = fields.get("data");
    image
        .filter(|v| !is_absent(v))
        .or_else(|| data.filter(|v| !is_absent(v)))
        .or(image)
        .or(data)
}

/// Resolve a success payload into an inline image reference.
///
/// Lists take their first element, objects take `image` then `data`, until
/// a non-empty string is reached. Anything else fails naming the type
/// encountered.
pub fn resolve_image(payload: &Value) -> Result<InlineImage> {
    let mut current = payload;
    loop {
        current = match ImageShape::from(current) {
            ImageShape::Text(text) if text.trim().is_empty() => {
                return Err(Error::UnexpectedImageFormat("empty string".to_string()))
            }
            ImageShape::Text(text) => return Ok(InlineImage::from_text(text)),
            ImageShape::Sequence(items) => items.first().ok_or_else(|| {
                Error::UnexpectedImageFormat("empty array".to_string())
            })?,
            ImageShape::Wrapper(fields) => wrapped_field(fields)
                .ok_or_else(|| Error::UnexpectedImageFormat("object".to_string()))?,
            ImageShape::Unrecognized(other) => {
                return Err(Error::UnexpectedImageFormat(type_name(other).to_string()))
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved(value: Value) -> String {
        resolve_image(&value).unwrap().into_string()
    }

    fn unexpected(value: Value) -> String {
        match resolve_image(&value) {
            Err(Error::UnexpectedImageFormat(found)) => found,
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_base64_gets_png_prefix() {
        assert_eq!(resolved(json!("AAAA")), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_data_uri_passes_through_verbatim() {
        assert_eq!(
            resolved(json!("data:image/jpeg;base64,ZZZZ")),
            "data:image/jpeg;base64,ZZZZ"
        );
    }

    #[test]
    fn test_sequence_is_unwrapped_before_prefixing() {
        assert_eq!(resolved(json!(["AAAA", "BBBB"])), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_wrapper_fields() {
        assert_eq!(resolved(json!({ "image": "AAAA" })), "data:image/png;base64,AAAA");
        assert_eq!(resolved(json!({ "data": "BBBB" })), "data:image/png;base64,BBBB");
    }

    #[test]
    fn test_image_field_wins_over_data() {
        assert_eq!(
            resolved(json!({ "data": "BBBB", "image": "AAAA" })),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_unusable_image_field_falls_back_to_data() {
        assert_eq!(
            resolved(json!({ "image": null, "data": "BBBB" })),
            "data:image/png;base64,BBBB"
        );
        assert_eq!(
            resolved(json!({ "image": "", "data": "BBBB" })),
            "data:image/png;base64,BBBB"
        );
    }

    #[test]
    fn test_empty_strings_are_rejected() {
        assert_eq!(unexpected(json!({ "image": "" })), "empty string");
        assert_eq!(unexpected(json!("  ")), "empty string");
        assert_eq!(unexpected(json!([""])), "empty string");
        assert_eq!(unexpected(json!({ "image": null, "data": "" })), "null");
    }

    #[test]
    fn test_nested_shapes_resolve() {
        let body = json!({
            "image": [{ "data": "CCCC" }],
            "prompt": "a garden",
            "style": "frida"
        });
        assert_eq!(resolved(body), "data:image/png;base64,CCCC");
    }

    #[test]
    fn test_unrecognized_shapes_name_the_type() {
        assert_eq!(unexpected(json!({ "unexpected": 5 })), "object");
        assert_eq!(unexpected(json!(42)), "number");
        assert_eq!(unexpected(json!(null)), "null");
        assert_eq!(unexpected(json!({ "image": true })), "boolean");
        assert_eq!(unexpected(json!([])), "empty array");
    }

    #[test]
    fn test_error_message_mentions_format() {
        let err = resolve_image(&json!(42)).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected image format: number");
    }

    #[test]
    fn test_media_type_and_decode() {
        let image = InlineImage::from_text("iVBORw==");
        assert_eq!(image.media_type(), Some("image/png"));
        assert_eq!(image.decode().unwrap(), vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_decode_rejects_non_base64_payloads() {
        let image = InlineImage::from_text("data:image/svg+xml,<svg/>");
        assert_eq!(image.media_type(), Some("image/svg+xml"));
        assert!(matches!(image.decode(), Err(Error::Decode(_))));

        let garbage = InlineImage::from_text("!!!invalid-base64!!!");
        assert!(matches!(garbage.decode(), Err(Error::Decode(_))));
    }
}
