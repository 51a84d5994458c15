//! Intent classification for inbound messages.
//!
//! Classification is an ordered rule list: the first matching rule wins.
//! The ordering is a behavioral contract — "analyze my hook video" must
//! resolve to `Analyze`, not `Hook`, because the analyze rule runs first.
//! Later rules are plain substring checks and would otherwise
//! false-positive on unrelated text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::profile::ProfileField;

/// The classified purpose of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Hook,
    Script,
    Story,
    Ideas,
    Fix,
    Ready,
    Analyze,
    Profile,
    Update,
    /// No actionable intent recognized.
    None,
}

impl Intent {
    /// The seven intents that render a content card from a template.
    pub const CONTENT: [Intent; 7] = [
        Intent::Hook,
        Intent::Script,
        Intent::Story,
        Intent::Ideas,
        Intent::Fix,
        Intent::Ready,
        Intent::Analyze,
    ];

    /// Lowercase tag name, used in logs and persisted state.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Hook => "hook",
            Intent::Script => "script",
            Intent::Story => "story",
            Intent::Ideas => "ideas",
            Intent::Fix => "fix",
            Intent::Ready => "ready",
            Intent::Analyze => "analyze",
            Intent::Profile => "profile",
            Intent::Update => "update",
            Intent::None => "none",
        }
    }

    /// Whether this intent renders a content card.
    pub fn is_content(&self) -> bool {
        Self::CONTENT.contains(self)
    }
}

/// One classification rule: how a lowercased message matches an intent.
enum Rule {
    /// Matches when the update-request regex matches.
    UpdateShape,
    /// Matches when any keyword is contained in the text.
    AnyOf(&'static [&'static str]),
}

impl Rule {
    fn matches(&self, lower: &str) -> bool {
        match self {
            Rule::UpdateShape => UPDATE_RE.is_match(lower),
            Rule::AnyOf(keywords) => keywords.iter().any(|kw| lower.contains(kw)),
        }
    }
}

/// Ordered classification rules. First match wins; order is load-bearing.
const RULES: &[(Intent, Rule)] = &[
    (Intent::Update, Rule::UpdateShape),
    (
        Intent::Analyze,
        Rule::AnyOf(&["analyze", "analysis", "evaluate", "review", "score", "rate"]),
    ),
    (Intent::Hook, Rule::AnyOf(&["hook"])),
    (Intent::Script, Rule::AnyOf(&["script", "brief"])),
    (Intent::Story, Rule::AnyOf(&["story"])),
    (Intent::Ideas, Rule::AnyOf(&["idea"])),
    (Intent::Fix, Rule::AnyOf(&["fix", "flop"])),
    (Intent::Ready, Rule::AnyOf(&["ready"])),
    (
        Intent::Profile,
        Rule::AnyOf(&["my info", "profile", "what do you know", "my data", "saved info"]),
    ),
];

static UPDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"update\s+(my)?\s*(tiktok|ig|instagram|product|brief)").expect("hardcoded regex")
});

static UPDATE_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)update\s+(?:my)?\s*(?:tiktok|ig|instagram|product|brief)(?:\s+handle)?(?:\s+(?:to|with|as))?\s+(.+)",
    )
    .expect("hardcoded regex")
});

/// Map message text to exactly one intent tag. Total and case-insensitive.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    for (intent, rule) in RULES {
        if rule.matches(&lower) {
            return *intent;
        }
    }
    Intent::None
}

/// Which profile field an update request refers to, checked in fixed order.
pub fn detect_update_field(text: &str) -> Option<ProfileField> {
    let lower = text.to_lowercase();
    if lower.contains("tiktok") {
        return Some(ProfileField::PrimaryHandle);
    }
    if lower.contains("instagram") || lower.contains("ig") {
        return Some(ProfileField::SecondaryHandle);
    }
    if lower.contains("product") || lower.contains("brief") {
        return Some(ProfileField::Brief);
    }
    None
}

/// Extract the value to assign from an update request.
///
/// Returns `None` when no value follows the field reference; the caller
/// replies with a clarification prompt in that case.
pub fn extract_update_value(text: &str) -> Option<String> {
    let value = UPDATE_VALUE_RE
        .captures(text)?
        .get(1)?
        .as_str()
        .trim()
        .to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_total() {
        // Every input maps to exactly one tag; unrecognized text maps to None.
        assert_eq!(classify(""), Intent::None);
        assert_eq!(classify("good morning"), Intent::None);
        assert_eq!(classify("¿qué tal?"), Intent::None);
    }

    #[test]
    fn test_classify_content_keywords() {
        assert_eq!(classify("give me a hook for my serum"), Intent::Hook);
        assert_eq!(classify("write a script please"), Intent::Script);
        assert_eq!(classify("here is my brief"), Intent::Script);
        assert_eq!(classify("tell a story"), Intent::Story);
        assert_eq!(classify("video ideas?"), Intent::Ideas);
        assert_eq!(classify("my video was a flop"), Intent::Fix);
        assert_eq!(classify("fix my video"), Intent::Fix);
        assert_eq!(classify("ready to shoot package"), Intent::Ready);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("GIVE ME A HOOK"), Intent::Hook);
        assert_eq!(classify("Analyze This"), Intent::Analyze);
    }

    #[test]
    fn test_analyze_precedes_content_keywords() {
        // Precedence contract: analyze is checked before the keyword rules.
        assert_eq!(classify("analyze my hook video"), Intent::Analyze);
        assert_eq!(classify("review my script"), Intent::Analyze);
        assert_eq!(classify("rate this story"), Intent::Analyze);
    }

    #[test]
    fn test_update_precedes_everything() {
        assert_eq!(classify("update my tiktok to @newhandle"), Intent::Update);
        assert_eq!(classify("update my brief to glow serum launch"), Intent::Update);
        // "brief" alone (no update shape) falls through to script.
        assert_eq!(classify("brief me on hooks"), Intent::Hook);
    }

    #[test]
    fn test_update_requires_known_field() {
        // "update my hook" names no updatable field — the update rule does
        // not match and the hook keyword wins.
        assert_eq!(classify("update my hook"), Intent::Hook);
    }

    #[test]
    fn test_profile_inquiry() {
        assert_eq!(classify("what do you know about me"), Intent::Profile);
        assert_eq!(classify("show my saved info"), Intent::Profile);
        assert_eq!(classify("my data please"), Intent::Profile);
    }

    #[test]
    fn test_detect_update_field_order() {
        assert_eq!(
            detect_update_field("update my tiktok to @x"),
            Some(ProfileField::PrimaryHandle)
        );
        assert_eq!(
            detect_update_field("update my instagram to @x"),
            Some(ProfileField::SecondaryHandle)
        );
        assert_eq!(
            detect_update_field("update my product brief"),
            Some(ProfileField::Brief)
        );
        assert_eq!(detect_update_field("update my hook"), None);
    }

    #[test]
    fn test_extract_update_value() {
        assert_eq!(
            extract_update_value("update my tiktok to @newhandle").as_deref(),
            Some("@newhandle")
        );
        assert_eq!(
            extract_update_value("Update my brief with SkinGlow serum, a vitamin C brand").as_deref(),
            Some("SkinGlow serum, a vitamin C brand")
        );
    }

    #[test]
    fn test_extract_update_value_tolerates_handle_word() {
        assert_eq!(
            extract_update_value("update my tiktok handle to @glowqueen").as_deref(),
            Some("@glowqueen")
        );
    }

    #[test]
    fn test_extract_update_value_missing() {
        assert_eq!(extract_update_value("update my tiktok"), None);
        assert_eq!(extract_update_value("update my brief   "), None);
    }

    #[test]
    fn test_intent_names_round_trip_serde() {
        let json = serde_json::to_string(&Intent::Ideas).unwrap();
        assert_eq!(json, "\"ideas\"");
        let back: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Intent::Ideas);
    }
}
