//! Static catalog of art styles
//!
//! A style is a named preset sent along with the prompt. The proxy and CLI
//! turn it into a modifier appended to the user's text.

use crate::prompts;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub modifier: &'static str,
}

/// The catalog. The first entry is the default selection.
pub static STYLES: [Style; 3] = [
    Style {
        id: "frida",
        name: "Frida Kahlo",
        description: "Vibrant colors, flowers and nature symbolism",
        modifier: "in the style of Frida Kahlo with vibrant colors, self-portrait elements, flowers in hair, and nature symbolism",
    },
    Style {
        id: "mural",
        name: "Mexican Muralism",
        description: "Bold cultural symbols and dramatic compositions",
        modifier: "in the style of Mexican muralism with bold cultural symbols, strong social themes, and dramatic compositions",
    },
    Style {
        id: "folk",
        name: "Folk Art",
        description: "Bright traditional colors and festive patterns",
        modifier: "in the style of Mexican folk art with bright traditional colors, intricate patterns, and festive cultural motifs",
    },
];

impl Style {
    pub fn default_style() -> &'static Style {
        &STYLES[0]
    }

    pub fn find(id: &str) -> Option<&'static Style> {
        STYLES.iter().find(|s| s.id == id)
    }

    /// Unknown ids fall back to the default style.
    pub fn find_or_default(id: &str) -> &'static Style {
        Self::find(id).unwrap_or_else(Self::default_style)
    }

    pub fn enhance_prompt(&self, prompt: &str) -> String {
        prompts::render(
            prompts::IMAGE_STYLE,
            &[("prompt", prompt), ("modifier", self.modifier)],
        )
    }

    /// Like [`Style::enhance_prompt`] with motion keywords for video.
    pub fn enhance_video_prompt(&self, prompt: &str) -> String {
        prompts::render(
            prompts::VIDEO_STYLE,
            &[("prompt", prompt), ("modifier", self.modifier)],
        )
    }
}
