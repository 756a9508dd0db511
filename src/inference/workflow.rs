//! ComfyUI AnimateDiff workflow for text-to-video jobs.

use crate::prompts;
use serde_json::{json, Value};

pub const FRAME_COUNT: u32 = 16;
pub const FRAME_SIZE: u32 = 512;
pub const CHECKPOINT: &str = "sd_v15_mm_sd_v15.ckpt";

/// Build the node graph for one clip. Node ids follow ComfyUI's API export
/// format: `["<node>", <output index>]` links an input to another node.
pub fn animatediff(enhanced_prompt: &str, seed: u64) -> Value {
    json!({
        "3": {
            "inputs": {
                "seed": seed,
                "steps": 25,
                "cfg": 7.5,
                "sampler_name": "euler",
                "scheduler": "normal",
                "denoise": 1.0,
                "model": ["4", 0],
                "positive": ["6", 0],
                "negative": ["7", 0],
                "latent_image": ["5", 0]
            },
            "class_type": "KSampler",
            "_meta": { "title": "KSampler" }
        },
        "4": {
            "inputs": { "ckpt_name": CHECKPOINT },
            "class_type": "CheckpointLoaderSimple",
            "_meta": { "title": "Load Checkpoint" }
        },
        "5": {
            "inputs": {
                "width": FRAME_SIZE,
                "height": FRAME_SIZE,
                "batch_size": FRAME_COUNT
            },
            "class_type": "EmptyLatentImage",
            "_meta": { "title": "Empty Latent Image" }
        },
        "6": {
            "inputs": { "text": enhanced_prompt, "clip": ["4", 1] },
            "class_type": "CLIPTextEncode",
            "_meta": { "title": "CLIP Text Encode (Positive)" }
        },
        "7": {
            "inputs": { "text": prompts::VIDEO_NEGATIVE.trim_end(), "clip": ["4", 1] },
            "class_type": "CLIPTextEncode",
            "_meta": { "title": "CLIP Text Encode (Negative)" }
        },
        "8": {
            "inputs": { "samples": ["3", 0], "vae": ["4", 2] },
            "class_type": "VAEDecode",
            "_meta": { "title": "VAE Decode" }
        },
        "9": {
            "inputs": { "filename_prefix": "maia_video", "images": ["8", 0] },
            "class_type": "SaveImage",
            "_meta": { "title": "Save Video" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_and_seed_are_wired_in() {
        let workflow = animatediff("a dancing skeleton", 42);
        assert_eq!(workflow["6"]["inputs"]["text"], "a dancing skeleton");
        assert_eq!(workflow["3"]["inputs"]["seed"], 42);
        assert_eq!(workflow["5"]["inputs"]["batch_size"], FRAME_COUNT);
    }

    #[test]
    fn test_negative_prompt_has_no_trailing_newline() {
        let workflow = animatediff("x", 0);
        let negative = workflow["7"]["inputs"]["text"].as_str().unwrap();
        assert!(negative.starts_with("blurry"));
        assert!(!negative.ends_with('\n'));
    }

    #[test]
    fn test_links_point_at_existing_nodes() {
        let workflow = animatediff("x", 0);
        let nodes = workflow.as_object().unwrap();
        for node in nodes.values() {
            for input in node["inputs"].as_object().unwrap().values() {
                if let Some([target, _]) = input.as_array().map(Vec::as_slice) {
                    let target = target.as_str().unwrap();
                    assert!(nodes.contains_key(target), "dangling link to {}", target);
                }
            }
        }
    }
}
