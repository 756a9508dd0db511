pub const IMAGE_STYLE: &str = include_str!("../data/prompts/image_style.txt");
pub const VIDEO_STYLE: &str = include_str!("../data/prompts/video_style.txt");
pub const VIDEO_NEGATIVE: &str = include_str!("../data/prompts/video_negative.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Trailing whitespace from the template file is dropped.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.trim_end().to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
