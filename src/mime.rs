//! Image formats we know how to name on disk.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl ImageFormat {
    /// Identify a format from its magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            _ => None,
        }
    }

    /// Parse a declared media type such as `image/jpeg`. Case-insensitive.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// File extension for an image: the declared media type wins, then the
/// bytes are sniffed, then `png`.
pub fn extension_for(declared: Option<&str>, bytes: &[u8]) -> &'static str {
    let format = declared
        .and_then(ImageFormat::from_media_type)
        .or_else(|| ImageFormat::sniff(bytes));

    match format {
        Some(format) => format.extension(),
        None => {
            tracing::warn!(
                "Unknown image type {:?} (leading bytes {:02X?}), saving as png",
                declared,
                &bytes[..bytes.len().min(4)]
            );
            ImageFormat::Png.extension()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(ImageFormat::sniff(b"\x89PNG\r\n\x1a\n"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xDB]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"GIF89a"), Some(ImageFormat::Gif));
    }

    #[test]
    fn test_sniff_rejects_short_or_unknown_input() {
        assert_eq!(ImageFormat::sniff(&[]), None);
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WAVE"), None);
        assert_eq!(ImageFormat::sniff(b"<svg"), None);
    }

    #[test]
    fn test_media_type_parsing() {
        assert_eq!(ImageFormat::from_media_type("IMAGE/JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_media_type("image/svg+xml"), None);
        assert_eq!(ImageFormat::Webp.media_type(), "image/webp");
    }

    #[test]
    fn test_extension_prefers_declared_type() {
        assert_eq!(extension_for(Some("image/jpeg"), b"\x89PNG"), "jpg");
    }

    #[test]
    fn test_extension_falls_back_to_sniffing_then_png() {
        assert_eq!(extension_for(Some("application/octet-stream"), &[0xFF, 0xD8, 0xFF]), "jpg");
        assert_eq!(extension_for(None, b"GIF87a"), "gif");
        assert_eq!(extension_for(None, &[0x00, 0x01]), "png");
    }
}
