//! Image prompt assembly.

use muse_core::text::PRODUCT_PLACEHOLDER;

/// Named style → fixed style phrase.
const STYLES: &[(&str, &str)] = &[
    ("cinematic", "high-quality cinematic shot with professional lighting"),
    ("minimal", "clean, minimalist composition with soft lighting"),
    ("vibrant", "vibrant colors with dynamic composition"),
    ("tiktok", "vertical format optimized for TikTok, trendy aesthetic"),
    ("instagram", "polished Instagram-ready composition with perfect lighting"),
    (
        "lineart",
        "black-and-white minimalist line art illustration, clean professional sketch style",
    ),
];

const DEFAULT_STYLE: &str = "cinematic";

fn style_phrase(style: &str) -> &'static str {
    STYLES
        .iter()
        .find(|(name, _)| *name == style)
        .or_else(|| STYLES.iter().find(|(name, _)| *name == DEFAULT_STYLE))
        .map(|(_, phrase)| *phrase)
        .unwrap_or(STYLES[0].1)
}

/// Build an image prompt from a visual cue, the product name, and a style.
///
/// The product is mentioned only when known (not the placeholder). Every
/// prompt carries the fixed creator-in-scene framing clause.
pub fn build_prompt(visual_cue: &str, product: &str, style: &str) -> String {
    let mut base = visual_cue.to_string();
    if !product.is_empty() && product != PRODUCT_PLACEHOLDER {
        base.push_str(&format!(" featuring {product}"));
    }
    base.push_str(". Show a female creator in the scene");

    format!(
        "Create a {} of: {base}. The image should be clean and minimal, \
         styled like elegant line art suitable for professional content marketing.",
        style_phrase(style)
    )
}
