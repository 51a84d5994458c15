//! Per-intent layout descriptors.
//!
//! Each content intent gets a small static table: branding emoji, color
//! palette, which personalization fields to surface, which summary lists
//! to append, and its fixed action row. The generic shell in `render`
//! walks these tables; only the primary-content builder is code.

use muse_core::{
    card::{Action, ActionStyle, Section},
    error::MuseError,
    intent::Intent,
};
use serde_json::Value;

use crate::render::primary;

// Apple-inspired palette shared across the card system.
pub const GREEN: &str = "#32D74B";
pub const ORANGE: &str = "#FF9F0A";
pub const PURPLE: &str = "#5856D6";
pub const LIGHT_BLUE: &str = "#64D2FF";
pub const RED: &str = "#FF3B30";
pub const BLUE: &str = "#147EFB";
pub const SKY: &str = "#5AC8FA";

/// Branding footer attached to every rendered card.
pub const BRAND: &str = "Muse • Your Creator Success Coach";

/// A bullet-list summary section appended after the primary content when
/// the backing array exists and is non-empty.
pub struct Summary {
    /// JSON pointer to a string array in the template.
    pub pointer: &'static str,
    pub title: &'static str,
    pub color: &'static str,
}

/// Layout descriptor for one content intent.
pub struct Layout {
    pub intent: Intent,
    pub emoji: &'static str,
    /// Primary-content colors, cycled `palette[i % len]`.
    pub palette: &'static [&'static str],
    /// (key under `creator_personalization`, field label); absent keys are
    /// omitted, never rendered empty.
    pub personalization: &'static [(&'static str, &'static str)],
    /// Intent-specific extra fields on the header section.
    pub header_extra: Option<fn(&Value, &mut Section)>,
    /// Builds the primary-content sections.
    pub primary: fn(&Value, &Layout) -> Result<Vec<Section>, MuseError>,
    pub summaries: &'static [Summary],
    pub actions: [Action; 3],
}

impl Layout {
    /// Cycling palette lookup — wraps, never clamps.
    pub fn color(&self, index: usize) -> &'static str {
        self.palette[index % self.palette.len()]
    }
}

const fn action(id: &'static str, label: &'static str, emoji: &'static str, style: ActionStyle) -> Action {
    Action { id, label, emoji, style }
}

/// Shared feedback row attached below every content card's action row.
pub const FEEDBACK_ROW: [Action; 3] = [
    action("feedback_love", "Love it!", "❤️", ActionStyle::Secondary),
    action("feedback_meh", "It's OK", "😐", ActionStyle::Secondary),
    action("feedback_help", "Need Help", "🆘", ActionStyle::Secondary),
];

static LAYOUTS: [Layout; 7] = [
    Layout {
        intent: Intent::Hook,
        emoji: "🪝",
        palette: &["#5AC8FA", "#147EFB", "#0A84FF"],
        personalization: &[
            ("content_style", "✨ Your Creator Superpower"),
            ("audience_insight", "👥 Your Audience Insight"),
        ],
        header_extra: None,
        primary: primary::hook,
        summaries: &[
            Summary {
                pointer: "/success_factors",
                title: "🏆 Why These Will Perform Well",
                color: GREEN,
            },
            Summary {
                pointer: "/content_guidance/key_talking_points",
                title: "🎯 Key Talking Points",
                color: ORANGE,
            },
        ],
        actions: [
            action("more_hooks", "Generate More", "🔄", ActionStyle::Primary),
            action("creator_focus", "More Creator Style", "👤", ActionStyle::Secondary),
            action("save_hook", "Save This Hook", "💾", ActionStyle::Success),
        ],
    },
    Layout {
        intent: Intent::Script,
        emoji: "📝",
        palette: &["#FF2D55", "#FF375F", "#FF3B30"],
        personalization: &[("content_style", "✨ Your Content Style")],
        header_extra: None,
        primary: primary::script,
        summaries: &[Summary {
            pointer: "/success_factors",
            title: "🏆 Why This Will Perform Well",
            color: GREEN,
        }],
        actions: [
            action("refine_script", "Refine Script", "✏️", ActionStyle::Primary),
            action("add_visuals", "Add Visual Notes", "🎨", ActionStyle::Secondary),
            action("save_script", "Save This Script", "💾", ActionStyle::Success),
        ],
    },
    Layout {
        intent: Intent::Story,
        emoji: "📖",
        palette: &["#5856D6", "#AF52DE", "#BF5AF2"],
        personalization: &[
            ("content_style", "✨ Your Storytelling Strength"),
            ("audience_insight", "👥 Audience Connection"),
        ],
        header_extra: Some(story_header_extra),
        primary: primary::story,
        summaries: &[Summary {
            pointer: "/authenticity_boosters",
            title: "✨ Authenticity Boosters",
            color: GREEN,
        }],
        actions: [
            action("more_emotional", "More Emotional", "❤️", ActionStyle::Primary),
            action("more_authentic", "More Authentic", "✅", ActionStyle::Secondary),
            action("save_story", "Save This Story", "💾", ActionStyle::Success),
        ],
    },
    Layout {
        intent: Intent::Ideas,
        emoji: "💡",
        palette: &["#FFD60A", "#FFCC00", "#FF9500"],
        personalization: &[
            ("audience_insight", "👥 Your Audience Insight"),
            ("content_style", "✨ Your Content Strength"),
        ],
        header_extra: None,
        primary: primary::ideas,
        summaries: &[],
        actions: [
            action("more_ideas", "More Ideas", "🔄", ActionStyle::Primary),
            action("trending_ideas", "Trending Ideas", "📈", ActionStyle::Secondary),
            action("save_idea", "Save This Idea", "💾", ActionStyle::Success),
        ],
    },
    Layout {
        intent: Intent::Fix,
        emoji: "🔧",
        palette: &["#32D74B", "#30D158", "#34C759"],
        personalization: &[
            ("content_style", "✨ Your Content Strength"),
            ("success_pattern", "📈 Your Success Pattern"),
        ],
        header_extra: Some(fix_header_extra),
        primary: primary::fix,
        summaries: &[],
        actions: [
            action("apply_fixes", "Apply All Fixes", "🛠️", ActionStyle::Primary),
            action("explain_more", "Explain More", "❓", ActionStyle::Secondary),
            action("save_fixes", "Save These Fixes", "💾", ActionStyle::Success),
        ],
    },
    Layout {
        intent: Intent::Ready,
        emoji: "🎬",
        palette: &["#FF9F0A", "#FF9F0A", "#FF9500"],
        personalization: &[
            ("content_style", "✨ Your Content Style"),
            ("audience_insight", "👥 Audience Insight"),
        ],
        header_extra: Some(ready_header_extra),
        primary: primary::ready,
        summaries: &[Summary {
            pointer: "/success_factors",
            title: "🏆 Why This Will Perform Well",
            color: GREEN,
        }],
        actions: [
            action("download_package", "Download Package", "📥", ActionStyle::Primary),
            action("refine_shots", "Refine Shots", "🎯", ActionStyle::Secondary),
            action("calendar_add", "Add to Calendar", "📅", ActionStyle::Success),
        ],
    },
    Layout {
        intent: Intent::Analyze,
        emoji: "📊",
        palette: &["#64D2FF", "#5AC8FA", "#0A84FF"],
        personalization: &[
            ("content_style", "✨ Your Content Style"),
            ("competitive_edge", "🏆 Your Competitive Edge"),
        ],
        header_extra: None,
        primary: primary::analyze,
        summaries: &[],
        actions: [
            action("deep_insights", "Deeper Insights", "🔍", ActionStyle::Primary),
            action("fix_issues", "Fix Issues", "🔧", ActionStyle::Secondary),
            action("save_analysis", "Save Analysis", "💾", ActionStyle::Success),
        ],
    },
];

/// The layout descriptor for a content intent, if one exists.
pub fn layout_for(intent: Intent) -> Option<&'static Layout> {
    LAYOUTS.iter().find(|l| l.intent == intent)
}

fn story_header_extra(template: &Value, header: &mut Section) {
    if let Some(theme) = template
        .pointer("/story_content/narrative_theme")
        .and_then(Value::as_str)
    {
        header.fields.push(muse_core::card::Field {
            name: "📖 Narrative Theme".into(),
            value: theme.to_string(),
            inline: false,
        });
    }
}

fn ready_header_extra(template: &Value, header: &mut Section) {
    if let Some(overview) = template
        .pointer("/production_package/concept_overview")
        .and_then(Value::as_str)
    {
        header.fields.push(muse_core::card::Field {
            name: "💡 Concept Overview".into(),
            value: overview.to_string(),
            inline: false,
        });
    }
}

fn fix_header_extra(template: &Value, header: &mut Section) {
    let current = template.pointer("/metadata/original_video_metrics");
    let potential = template.pointer("/metadata/potential_performance");
    let (Some(current), Some(potential)) = (current, potential) else {
        return;
    };

    let mut lines = String::from("**Current vs Potential Performance:**\n");
    for (key, label) in [
        ("estimated_watch_time", "Watch Time"),
        ("estimated_engagement_rate", "Engagement Rate"),
        ("conversion_rate", "Conversion"),
    ] {
        if let (Some(from), Some(to)) = (
            current.get(key).and_then(Value::as_str),
            potential.get(key).and_then(Value::as_str),
        ) {
            lines.push_str(&format!("{label}: {from} → {to}\n"));
        }
    }

    header.fields.push(muse_core::card::Field {
        name: "📊 Performance Impact".into(),
        value: lines,
        inline: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_content_intent_has_a_layout() {
        for intent in Intent::CONTENT {
            let layout = layout_for(intent).expect("missing layout");
            assert_eq!(layout.intent, intent);
            assert!(!layout.palette.is_empty());
        }
        assert!(layout_for(Intent::Update).is_none());
        assert!(layout_for(Intent::Profile).is_none());
    }

    #[test]
    fn test_palette_cycles_not_clamps() {
        let layout = layout_for(Intent::Hook).unwrap();
        assert_eq!(layout.color(0), layout.color(3));
        assert_eq!(layout.color(1), layout.color(4));
        assert_ne!(layout.color(0), layout.color(1));
    }

    #[test]
    fn test_action_rows_are_three_wide() {
        for intent in Intent::CONTENT {
            let layout = layout_for(intent).unwrap();
            assert_eq!(layout.actions.len(), 3);
        }
        assert_eq!(FEEDBACK_ROW.len(), 3);
    }
}
