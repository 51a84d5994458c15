//! Small text helpers shared by the router and renderer.

use regex::Regex;
use std::sync::LazyLock;

/// Placeholder used when no product name can be determined.
pub const PRODUCT_PLACEHOLDER: &str = "your product";

static PRODUCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)product(?:\s+name)?[:\s]+([^\n.,]+)").expect("hardcoded regex")
});

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)name[:\s]+([^\n.,]+)").expect("hardcoded regex"));

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+(?:my|our)\s+(?:new\s+)?([^\n.,!?]+)").expect("hardcoded regex")
});

/// Extract a product name from a stored brief.
///
/// Falls back to a generic placeholder when the brief is empty or names
/// nothing recognizable.
pub fn extract_product_name(brief: &str) -> String {
    if brief.is_empty() {
        return PRODUCT_PLACEHOLDER.to_string();
    }
    if let Some(caps) = PRODUCT_RE.captures(brief) {
        return caps[1].trim().to_string();
    }
    if let Some(caps) = NAME_RE.captures(brief) {
        return caps[1].trim().to_string();
    }
    PRODUCT_PLACEHOLDER.to_string()
}

/// Pull a product mention out of free message text
/// (e.g. "give me a hook for my new SkinGlow serum" → "SkinGlow serum").
///
/// Used when the stored brief yields no product name.
pub fn extract_product_mention(text: &str) -> Option<String> {
    let value = MENTION_RE.captures(text)?.get(1)?.as_str().trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("hardcoded regex"));

/// First URL in the text, if any.
pub fn extract_url(text: &str) -> Option<&str> {
    URL_RE.find(text).map(|m| m.as_str())
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_product_name_from_brief() {
        assert_eq!(
            extract_product_name("Product: SkinGlow serum. Audience: 18-25"),
            "SkinGlow serum"
        );
        assert_eq!(
            extract_product_name("product name: GlowPatch\nmore text"),
            "GlowPatch"
        );
        assert_eq!(extract_product_name("brand name: Lumo, skincare"), "Lumo");
    }

    #[test]
    fn test_extract_product_name_fallback() {
        assert_eq!(extract_product_name(""), PRODUCT_PLACEHOLDER);
        assert_eq!(extract_product_name("just some words"), PRODUCT_PLACEHOLDER);
    }

    #[test]
    fn test_extract_product_mention() {
        assert_eq!(
            extract_product_mention("give me a hook for my new SkinGlow serum").as_deref(),
            Some("SkinGlow serum")
        );
        assert_eq!(
            extract_product_mention("script for our protein bar").as_deref(),
            Some("protein bar")
        );
        assert_eq!(extract_product_mention("give me a hook"), None);
    }

    #[test]
    fn test_extract_url() {
        assert_eq!(
            extract_url("analyze this: https://tiktok.com/@me/video/1 please"),
            Some("https://tiktok.com/@me/video/1")
        );
        assert_eq!(extract_url("analyze my last video"), None);
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("hook"), "Hook");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("überhook"), "Überhook");
    }
}
