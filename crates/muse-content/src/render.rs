//! Card rendering: one generic shell driven by the layout descriptors.
//!
//! Every content card shares the same skeleton — branded header with
//! personalization, primary-content sections on a cycling palette,
//! optional summary sections, a fixed action row plus the feedback row.
//! The per-intent differences live in `primary` builders and the static
//! tables in `layout`.

use muse_core::{
    card::{Card, Field, Section},
    error::MuseError,
    intent::Intent,
    profile::UserProfile,
    text::capitalize_first,
};
use serde_json::Value;

use crate::layout::{
    layout_for, Layout, BLUE, BRAND, FEEDBACK_ROW, GREEN, LIGHT_BLUE, ORANGE, PURPLE, RED, SKY,
};
use muse_core::card::{Action, ActionStyle};

/// Render a content card for `intent` from a template document.
///
/// Returns `MuseError::Content` when the template violates the intent's
/// minimum shape (below what the template store's fallback guarantees);
/// the router turns that into an apologetic reply.
pub fn render(
    intent: Intent,
    template: &Value,
    profile: &UserProfile,
    product: &str,
) -> Result<Card, MuseError> {
    let layout = layout_for(intent)
        .ok_or_else(|| MuseError::Content(format!("no layout for intent '{}'", intent.name())))?;

    // Analysis cards talk about the user's content, not a product.
    let product = if intent == Intent::Analyze {
        "your content"
    } else {
        product
    };

    let title = format!(
        "{} {} for {}",
        layout.emoji,
        capitalize_first(intent.name()),
        product
    );
    let mut card = Card::new(title.clone());
    card.footer = Some(BRAND.to_string());

    let mut header = Section::new(
        layout.palette[0],
        title,
        format!(
            "Hi {}, I've created this personalized {} to help your content stand out.",
            profile.primary_handle,
            intent.name()
        ),
    );
    for (key, label) in layout.personalization {
        if let Some(value) = template
            .pointer(&format!("/creator_personalization/{key}"))
            .and_then(Value::as_str)
        {
            header.fields.push(Field {
                name: (*label).to_string(),
                value: value.to_string(),
                inline: false,
            });
        }
    }
    if let Some(extra) = layout.header_extra {
        extra(template, &mut header);
    }
    card.sections.push(header);

    // Zero content items is a real state for ideas: render an explicit
    // error section rather than a partial card with an empty featured slot.
    if intent == Intent::Ideas && !has_items(template, "/video_ideas") {
        card.sections.push(Section::new(
            RED,
            "❌ Error: No Video Ideas Found",
            "No video ideas were found in the response data.",
        ));
        return Ok(card);
    }

    card.sections.extend((layout.primary)(template, layout)?);

    for summary in layout.summaries {
        let items = string_items(template, summary.pointer);
        if !items.is_empty() {
            card.sections
                .push(bullet_section(summary.color, summary.title, &items));
        }
    }

    card.action_rows.push(layout.actions.to_vec());
    card.action_rows.push(FEEDBACK_ROW.to_vec());
    Ok(card)
}

/// The saved-profile card.
pub fn render_profile(profile: &UserProfile) -> Card {
    let mut card = Card::new("👤 Your Creator Profile");
    card.footer = Some(BRAND.to_string());
    card.sections.push(
        Section::new(SKY, "👤 Your Creator Profile", "Here's what I've saved about you:")
            .field(
                "📱 TikTok Handle",
                if profile.primary_handle.is_empty() {
                    "Not set".to_string()
                } else {
                    profile.primary_handle.clone()
                },
                true,
            )
            .field(
                "📸 Instagram Handle",
                profile
                    .secondary_handle
                    .clone()
                    .unwrap_or_else(|| "Not set".to_string()),
                true,
            )
            .field(
                "📄 Product Brief",
                if profile.brief.is_empty() {
                    "Not provided"
                } else {
                    "✅ Saved"
                },
                true,
            )
            .field(
                "🧠 Last Intent",
                profile
                    .last_intent
                    .map(|i| i.name().to_string())
                    .unwrap_or_else(|| "None yet".to_string()),
                true,
            ),
    );
    card.action_rows.push(vec![Action {
        id: "update_info",
        label: "Update Info",
        emoji: "✏️",
        style: ActionStyle::Primary,
    }]);
    card
}

/// The welcome/help card sent when no intent is recognized.
pub fn render_help() -> Card {
    let mut card = Card::new("👋 Hi there! I'm your Creator Success Coach");
    card.footer = Some(BRAND.to_string());
    card.sections.push(
        Section::new(
            BLUE,
            "👋 Hi there! I'm your Creator Success Coach",
            "I can help you create viral content that converts! Here's what you can ask me to do:",
        )
        .field("🪝 Hook", "Generate attention-grabbing hooks", true)
        .field("📝 Script", "Create a full video script", true)
        .field("📖 Story", "Craft a story-driven script", true)
        .field("💡 Ideas", "Generate video concept ideas", true)
        .field("🔧 Fix", "Improve your existing video", true)
        .field("🎬 Ready", "Get a ready-to-shoot package", true)
        .field("📊 Analyze", "Analyze your video performance", true),
    );
    card.action_rows.push(vec![
        Action {
            id: "example_hook",
            label: "Example: Generate a Hook",
            emoji: "🪝",
            style: ActionStyle::Primary,
        },
        Action {
            id: "example_script",
            label: "Example: Create a Script",
            emoji: "📝",
            style: ActionStyle::Primary,
        },
    ]);
    card
}

/// Instructions shown after the profile card's Update Info button.
pub fn render_update_help() -> Card {
    let mut card = Card::new("✏️ Update Your Profile");
    card.sections.push(
        Section::new(
            SKY,
            "✏️ Update Your Profile",
            "You can update your information with these commands:",
        )
        .field("TikTok Handle", "Type: `update my tiktok to @yourhandle`", false)
        .field(
            "Instagram Handle",
            "Type: `update my instagram to @yourhandle`",
            false,
        )
        .field(
            "Product Brief",
            "Type: `update my brief to [your product description]`",
            false,
        ),
    );
    card
}

/// Apologetic card for renderer failures; the process keeps serving.
pub fn render_failure(intent: Intent, detail: &str) -> Card {
    let mut card = Card::new("❌ Error Generating Content");
    card.footer = Some(BRAND.to_string());
    card.sections.push(Section::new(
        RED,
        "❌ Error Generating Content",
        format!(
            "Failed to generate {} content. Please try again later.\n\nError details: {detail}",
            intent.name()
        ),
    ));
    card
}

// --- Shared helpers ---

fn has_items(template: &Value, pointer: &str) -> bool {
    template
        .pointer(pointer)
        .and_then(Value::as_array)
        .is_some_and(|a| !a.is_empty())
}

/// String array at a JSON pointer; non-string entries are skipped.
fn string_items(template: &Value, pointer: &str) -> Vec<String> {
    template
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn bullet_section(color: &'static str, title: &str, items: &[String]) -> Section {
    let body = items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    Section::new(color, title, body)
}

fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}

fn str_at<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn require_str<'a>(value: &'a Value, key: &str, what: &str) -> Result<&'a str, MuseError> {
    str_at(value, key).ok_or_else(|| MuseError::Content(format!("{what} missing '{key}'")))
}

fn require_array<'a>(value: &'a Value, key: &str, what: &str) -> Result<&'a Vec<Value>, MuseError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| MuseError::Content(format!("{what} missing '{key}' list")))
}

/// Display form of a JSON leaf (strings unquoted, everything else compact).
fn text_of(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// Emoji for a score out of 10.
pub fn score_emoji(score: f64) -> &'static str {
    if score >= 8.0 {
        "🔥"
    } else if score >= 6.0 {
        "👍"
    } else if score >= 4.0 {
        "😐"
    } else {
        "👎"
    }
}

/// One-word verdict for a score out of 10.
pub fn score_word(score: f64) -> &'static str {
    if score >= 8.5 {
        "Excellent"
    } else if score >= 7.5 {
        "Very Good"
    } else if score >= 6.5 {
        "Good"
    } else if score >= 5.5 {
        "Average"
    } else if score >= 4.5 {
        "Fair"
    } else if score >= 3.5 {
        "Needs Work"
    } else {
        "Poor"
    }
}

// --- Primary-content builders, one per intent ---

pub(crate) mod primary {
    use super::*;

    fn segment_emoji(kind: &str) -> &'static str {
        match kind {
            "intro" => "👋",
            "problem" => "❓",
            "solution" => "💡",
            "evidence" => "✅",
            "cta" => "🔗",
            _ => "📝",
        }
    }

    fn story_segment_emoji(kind: &str) -> &'static str {
        match kind {
            "problem_establishment" => "😟",
            "struggle" => "😖",
            "discovery" => "💡",
            "transformation" => "✨",
            "sharing" => "🤝",
            _ => "📝",
        }
    }

    pub(crate) fn hook(template: &Value, layout: &Layout) -> Result<Vec<Section>, MuseError> {
        let hooks = require_array(template, "hook_options", "hook template")?;
        if hooks.is_empty() {
            return Err(MuseError::Content("hook template has no hook_options".into()));
        }

        let mut sections = Vec::with_capacity(hooks.len());
        for (i, hook) in hooks.iter().enumerate() {
            let text = require_str(hook, "text", "hook option")?;
            let mut section = Section::new(layout.color(i), format!("Hook {}", i + 1), quoted(text));
            if let Some(style) = str_at(hook, "style") {
                section.fields.push(Field {
                    name: "🎭 Style".into(),
                    value: style.to_string(),
                    inline: true,
                });
            }
            if let Some(engagement) = str_at(hook, "predicted_engagement") {
                section.fields.push(Field {
                    name: "📈 Predicted Engagement".into(),
                    value: engagement.to_string(),
                    inline: true,
                });
            }
            if let Some(visual) = template
                .pointer(&format!("/visual_direction/hook_{}_visuals", i + 1))
                .and_then(Value::as_str)
            {
                section.fields.push(Field {
                    name: "🎬 Visual Direction".into(),
                    value: visual.to_string(),
                    inline: false,
                });
            }
            if let Some(strength) = str_at(hook, "strength") {
                section.fields.push(Field {
                    name: "💪 Why This Works For Your Audience".into(),
                    value: strength.to_string(),
                    inline: false,
                });
            }
            sections.push(section);
        }
        Ok(sections)
    }

    pub(crate) fn script(template: &Value, layout: &Layout) -> Result<Vec<Section>, MuseError> {
        let content = template
            .get("script_content")
            .ok_or_else(|| MuseError::Content("script template missing 'script_content'".into()))?;
        let hook_text = require_str(content, "hook", "script content")?;
        let segments = require_array(content, "segments", "script content")?;

        let mut sections = Vec::with_capacity(segments.len() + 1);
        sections.push(Section::new(
            layout.palette[0],
            "🪝 Opening Hook",
            quoted(hook_text),
        ));

        for (i, segment) in segments.iter().enumerate() {
            let kind = str_at(segment, "type").unwrap_or("segment");
            let mut section = Section::new(
                layout.color(i),
                format!("{} {}", segment_emoji(kind), capitalize_first(kind)),
                quoted(str_at(segment, "script").unwrap_or_default()),
            );
            if let Some(visual) = str_at(segment, "visual_direction") {
                section.fields.push(Field {
                    name: "🎬 Visual".into(),
                    value: visual.to_string(),
                    inline: true,
                });
            }
            if let Some(text) = str_at(segment, "on_screen_text") {
                section.fields.push(Field {
                    name: "📝 On-Screen Text".into(),
                    value: text.to_string(),
                    inline: true,
                });
            }
            if let Some(note) = str_at(segment, "performance_note") {
                section.fields.push(Field {
                    name: "📊 Performance Note".into(),
                    value: note.to_string(),
                    inline: false,
                });
            }
            sections.push(section);
        }
        Ok(sections)
    }

    pub(crate) fn story(template: &Value, layout: &Layout) -> Result<Vec<Section>, MuseError> {
        let content = template
            .get("story_content")
            .ok_or_else(|| MuseError::Content("story template missing 'story_content'".into()))?;
        let hook_text = require_str(content, "hook", "story content")?;
        let segments = require_array(content, "segments", "story content")?;

        let mut sections = Vec::with_capacity(segments.len() + 1);
        sections.push(Section::new(
            layout.palette[0],
            "🪝 Story Hook",
            quoted(hook_text),
        ));

        for (i, segment) in segments.iter().enumerate() {
            let kind = str_at(segment, "type").unwrap_or("segment");
            let mut section = Section::new(
                layout.color(i),
                format!(
                    "{} {}",
                    story_segment_emoji(kind),
                    capitalize_first(&kind.replace('_', " "))
                ),
                quoted(str_at(segment, "script").unwrap_or_default()),
            );
            if let Some(visual) = str_at(segment, "visual_direction") {
                section.fields.push(Field {
                    name: "🎬 Visual".into(),
                    value: visual.to_string(),
                    inline: true,
                });
            }
            if let Some(tone) = str_at(segment, "emotional_tone") {
                section.fields.push(Field {
                    name: "💓 Emotional Tone".into(),
                    value: tone.to_string(),
                    inline: true,
                });
            }
            if let Some(connection) = str_at(segment, "audience_connection") {
                section.fields.push(Field {
                    name: "👥 Audience Connection".into(),
                    value: connection.to_string(),
                    inline: false,
                });
            }
            sections.push(section);
        }
        Ok(sections)
    }

    /// Rendered scenes are capped at four; extra structure entries only
    /// show through the key-visual cycle.
    pub(crate) const MAX_IDEA_SCENES: usize = 4;

    pub(crate) fn ideas(template: &Value, layout: &Layout) -> Result<Vec<Section>, MuseError> {
        // Emptiness was handled by the shell; the list is present here.
        let ideas = require_array(template, "video_ideas", "ideas template")?;
        let main = &ideas[0];

        let mut sections = Vec::new();
        let mut featured = Section::new(
            layout.palette[0],
            format!(
                "💡 Featured Concept: {}",
                str_at(main, "concept").unwrap_or("Untitled")
            ),
            quoted(str_at(main, "hook").unwrap_or_default()),
        );
        if let Some(alignment) = str_at(main, "audience_alignment") {
            featured.fields.push(Field {
                name: "👥 Audience Alignment".into(),
                value: alignment.to_string(),
                inline: false,
            });
        }
        sections.push(featured);

        let structure = main
            .get("structure")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let visuals = main
            .get("key_visuals")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for (i, step) in structure.iter().take(MAX_IDEA_SCENES).enumerate() {
            let mut body = format!("**Script:** {}\n", text_of(step));
            if !visuals.is_empty() {
                body.push_str(&format!(
                    "**Visual:** {}\n",
                    text_of(&visuals[i % visuals.len()])
                ));
            }
            sections.push(Section::new(
                layout.color(i),
                format!("🎬 Scene {}", i + 1),
                body,
            ));
        }

        if let Some(prediction) = main.get("performance_prediction").and_then(Value::as_object) {
            let body = prediction
                .iter()
                .map(|(key, value)| {
                    format!(
                        "• **{}:** {}",
                        capitalize_first(&key.replace('_', " ")),
                        text_of(value)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(Section::new(GREEN, "📊 Performance Prediction", body));
        }

        if ideas.len() > 1 {
            let mut body = String::new();
            for (i, idea) in ideas.iter().skip(1).take(3).enumerate() {
                body.push_str(&format!(
                    "### Option {}: {}\n",
                    i + 1,
                    str_at(idea, "concept").unwrap_or("Untitled")
                ));
                body.push_str(&format!(
                    "Hook: \"{}\"\n\n",
                    str_at(idea, "hook").unwrap_or_default()
                ));
                if let Some(alignment) = str_at(idea, "audience_alignment") {
                    body.push_str(&format!("**Audience Alignment:** {alignment}\n\n"));
                }
            }
            sections.push(Section::new(ORANGE, "🔍 Alternative Concepts", body));
        }

        if let Some(guidance) = template.get("implementation_guidance") {
            let mut body = format!(
                "**Recommended Concept:** {}\n",
                str_at(guidance, "recommended_concept").unwrap_or_default()
            );
            body.push_str(&format!(
                "**Reasoning:** {}\n\n",
                str_at(guidance, "reasoning").unwrap_or_default()
            ));
            let tips = string_items(guidance, "/execution_tips");
            if !tips.is_empty() {
                body.push_str("**Execution Tips:**\n");
                body.push_str(
                    &tips
                        .iter()
                        .map(|tip| format!("• {tip}"))
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
            }
            sections.push(Section::new(PURPLE, "📋 Implementation Guidance", body));
        }

        Ok(sections)
    }

    pub(crate) fn fix(template: &Value, layout: &Layout) -> Result<Vec<Section>, MuseError> {
        let plan = template
            .get("improvement_plan")
            .ok_or_else(|| MuseError::Content("fix template missing 'improvement_plan'".into()))?;

        let mut sections = Vec::new();

        let revision = plan
            .get("hook_revision")
            .ok_or_else(|| MuseError::Content("fix plan missing 'hook_revision'".into()))?;
        let mut hook_section = Section::new(
            layout.palette[0],
            "🪝 Hook Improvement",
            format!(
                "**Original:**\n\"{}\"\n\n**Improved:**\n\"{}\"\n\n**Explanation:**\n{}",
                require_str(revision, "original", "hook revision")?,
                require_str(revision, "improved", "hook revision")?,
                str_at(revision, "explanation").unwrap_or_default()
            ),
        );
        if let Some(impact) = str_at(revision, "impact_prediction") {
            hook_section.fields.push(Field {
                name: "📈 Expected Impact".into(),
                value: impact.to_string(),
                inline: false,
            });
        }
        sections.push(hook_section);

        let improvements = require_array(plan, "structure_improvements", "fix plan")?;
        for (i, improvement) in improvements.iter().enumerate() {
            let mut section = Section::new(
                layout.color(i + 1),
                format!("🔧 Structure Fix {}", i + 1),
                format!(
                    "**Issue:** {}\n\n**Fix:** {}\n\n**Example:** {}",
                    str_at(improvement, "issue").unwrap_or_default(),
                    str_at(improvement, "fix").unwrap_or_default(),
                    str_at(improvement, "example").unwrap_or_default()
                ),
            );
            if let Some(impact) = str_at(improvement, "impact_prediction") {
                section.fields.push(Field {
                    name: "📈 Expected Impact".into(),
                    value: impact.to_string(),
                    inline: false,
                });
            }
            if let Some(visual) = str_at(improvement, "visual_direction") {
                section.fields.push(Field {
                    name: "🎬 Visual Direction".into(),
                    value: visual.to_string(),
                    inline: false,
                });
            }
            sections.push(section);
        }

        let cta = plan
            .get("cta_improvements")
            .ok_or_else(|| MuseError::Content("fix plan missing 'cta_improvements'".into()))?;
        let mut cta_section = Section::new(
            layout.palette[0],
            "🔗 Call-to-Action Improvement",
            format!(
                "**Original:**\n\"{}\"\n\n**Improved:**\n\"{}\"\n\n**Explanation:**\n{}",
                require_str(cta, "original", "cta improvement")?,
                require_str(cta, "improved", "cta improvement")?,
                str_at(cta, "explanation").unwrap_or("More engaging and action-oriented")
            ),
        );
        if let Some(impact) = str_at(cta, "impact_prediction") {
            cta_section.fields.push(Field {
                name: "📈 Expected Impact".into(),
                value: impact.to_string(),
                inline: false,
            });
        }
        sections.push(cta_section);

        sections.push(Section::new(
            PURPLE,
            "📝 Revised Script",
            require_str(template, "revised_script", "fix template")?,
        ));

        if let Some(metrics) = template.get("success_metrics") {
            let mut body = format!(
                "**{}**\n\n**Primary Impact:** {}\n\n",
                str_at(metrics, "expected_improvement").unwrap_or_default(),
                str_at(metrics, "primary_indicator").unwrap_or_default()
            );
            let indicators = string_items(metrics, "/secondary_indicators");
            if !indicators.is_empty() {
                body.push_str("**Secondary Indicators:**\n");
                body.push_str(
                    &indicators
                        .iter()
                        .map(|i| format!("• {i}"))
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
            }
            sections.push(Section::new(GREEN, "📊 Success Metrics", body));
        }

        Ok(sections)
    }

    /// Only the first few shots get their own section.
    pub(crate) const MAX_READY_SHOTS: usize = 5;

    pub(crate) fn ready(template: &Value, layout: &Layout) -> Result<Vec<Section>, MuseError> {
        let package = template
            .get("production_package")
            .ok_or_else(|| MuseError::Content("ready template missing 'production_package'".into()))?;

        let mut sections = Vec::new();

        let hooks = require_array(package, "hook_options", "production package")?;
        let recommended = hooks
            .first()
            .ok_or_else(|| MuseError::Content("production package has no hook options".into()))?;
        let mut hook_section = Section::new(
            layout.palette[0],
            "🪝 Recommended Hook",
            quoted(require_str(recommended, "text", "recommended hook")?),
        );
        if let Some(alignment) = str_at(recommended, "audience_alignment") {
            hook_section.fields.push(Field {
                name: "👥 Audience Alignment".into(),
                value: alignment.to_string(),
                inline: false,
            });
        }
        if let Some(visual) = str_at(recommended, "visual_direction") {
            hook_section.fields.push(Field {
                name: "🎬 Visual Direction".into(),
                value: visual.to_string(),
                inline: false,
            });
        }
        sections.push(hook_section);

        let shots = require_array(package, "shot_list", "production package")?;
        for (i, shot) in shots.iter().take(MAX_READY_SHOTS).enumerate() {
            let number = shot
                .get("shot_number")
                .map(text_of)
                .unwrap_or_else(|| (i + 1).to_string());
            let mut body = format!(
                "**Description:** {}\n**Duration:** {}\n**Camera:** {}\n",
                str_at(shot, "description").unwrap_or_default(),
                str_at(shot, "duration").unwrap_or_default(),
                str_at(shot, "camera_angle").unwrap_or_default()
            );
            if let Some(text) = str_at(shot, "on_screen_text") {
                body.push_str(&format!("**Text:** {text}\n"));
            }
            let mut section = Section::new(layout.color(i), format!("🎬 Shot {number}"), body);
            if let Some(note) = str_at(shot, "performance_note") {
                section.fields.push(Field {
                    name: "📊 Performance Note".into(),
                    value: note.to_string(),
                    inline: false,
                });
            }
            sections.push(section);
        }

        if let Some(script) = package.get("script") {
            let mut body = String::new();
            if let Some(hook) = str_at(script, "hook") {
                body.push_str(&format!("**Hook:** \"{hook}\"\n\n"));
            }
            if let Some(script_body) = str_at(script, "body") {
                body.push_str(&format!("**Body:** \"{script_body}\""));
            }
            sections.push(Section::new(PURPLE, "📝 Complete Script", body));
        }

        if let Some(tech) = package
            .get("technical_recommendations")
            .and_then(Value::as_object)
        {
            let body = tech
                .iter()
                .map(|(key, value)| {
                    format!("• **{}:** {}", capitalize_first(key), text_of(value))
                })
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(Section::new(LIGHT_BLUE, "🔧 Technical Tips", body));
        }

        Ok(sections)
    }

    pub(crate) fn analyze(template: &Value, layout: &Layout) -> Result<Vec<Section>, MuseError> {
        let mut sections = Vec::new();

        let summary = template.get("performance_summary");
        if let Some(summary) = summary {
            sections.push(Section::new(
                layout.palette[0],
                "📊 Performance Overview",
                format!(
                    "**Overall Score:** {}/10\n**Potential Improvement:** {}\n**Strongest Element:** {}\n**Focus Area:** {}",
                    summary.get("overall_score").map(text_of).unwrap_or_default(),
                    str_at(summary, "potential_improvement").unwrap_or_default(),
                    str_at(summary, "strongest_element").unwrap_or_default(),
                    str_at(summary, "focus_area").unwrap_or_default()
                ),
            ));
        }

        let benchmarks = template.get("benchmark_data");
        if let Some(benchmarks) = benchmarks {
            if let Some(voice) = benchmarks.get("voice_delivery") {
                sections.push(benchmark_section(layout.palette[1], "🎤 Voice & Delivery", voice));
            }
            if let Some(hook) = benchmarks.get("hook") {
                sections.push(benchmark_section(layout.palette[2], "🪝 Hook", hook));
            }
        }

        let insights = string_items(template, "/audience_specific_insights");
        if !insights.is_empty() {
            sections.push(bullet_section(ORANGE, "👥 Your Audience Insights", &insights));
        }

        if let Some(focus_area) = summary.and_then(|s| str_at(s, "focus_area")) {
            let focus_lower = focus_area.to_lowercase();
            let focus_data = benchmarks.and_then(|b| {
                if focus_lower.contains("hook") {
                    b.get("hook")
                } else if focus_lower.contains("voice") {
                    b.get("voice_delivery")
                } else {
                    None
                }
            });

            let mut body = format!(
                "Focus first on enhancing your **{focus_area}** with these specific recommendations:\n\n"
            );
            let opportunities =
                focus_data.map(|d| string_items(d, "/opportunities")).unwrap_or_default();
            if opportunities.is_empty() {
                body.push_str("• Implement the opportunities noted in your focus area section.");
            } else {
                body.push_str(
                    &opportunities
                        .iter()
                        .enumerate()
                        .map(|(i, opp)| format!("{}. {opp}", i + 1))
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
            }
            sections.push(Section::new(GREEN, "🚀 Next Steps", body));
        }

        Ok(sections)
    }

    fn benchmark_section(color: &'static str, title: &str, data: &Value) -> Section {
        let score = data
            .get("your_score")
            .and_then(Value::as_f64)
            .unwrap_or_default();
        let mut body = format!(
            "**Your Score:** {}/10 ({} {})\n",
            data.get("your_score").map(text_of).unwrap_or_default(),
            score_emoji(score),
            score_word(score)
        );
        body.push_str(&format!(
            "**Industry Average:** {}/10\n",
            data.get("industry_avg").map(text_of).unwrap_or_default()
        ));
        body.push_str(&format!(
            "**Percentile:** {}%\n\n",
            data.get("percentile").map(text_of).unwrap_or_default()
        ));

        let strengths = string_items(data, "/strengths");
        body.push_str("**Strengths:**\n");
        body.push_str(
            &strengths
                .iter()
                .map(|s| format!("• {s}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
        let opportunities = string_items(data, "/opportunities");
        body.push_str("\n\n**Opportunities:**\n");
        body.push_str(
            &opportunities
                .iter()
                .map(|o| format!("• {o}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );

        Section::new(color, title, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;
    use serde_json::json;

    fn profile() -> UserProfile {
        UserProfile::new("u1", "@glowqueen")
    }

    #[test]
    fn test_hook_card_header_names_product() {
        let template = templates::fallback(Intent::Hook);
        let card = render(Intent::Hook, &template, &profile(), "SkinGlow serum").unwrap();

        assert!(card.sections[0].title.contains("SkinGlow serum"));
        assert!(card.sections[0].title.contains("Hook"));
        assert!(card.sections[0].body.contains("@glowqueen"));
    }

    #[test]
    fn test_color_cycling_with_five_entries() {
        let template = json!({
            "hook_options": [
                {"text": "one"}, {"text": "two"}, {"text": "three"},
                {"text": "four"}, {"text": "five"}
            ]
        });
        let card = render(Intent::Hook, &template, &profile(), "your product").unwrap();

        // Sections: header at 0, hooks at 1..=5. With a 3-color palette,
        // entries 0 and 3 share a color, as do entries 1 and 4.
        assert_eq!(card.sections[1].color, card.sections[4].color);
        assert_eq!(card.sections[2].color, card.sections[5].color);
        assert_ne!(card.sections[1].color, card.sections[2].color);
    }

    #[test]
    fn test_absent_personalization_is_omitted() {
        let template = json!({ "hook_options": [{"text": "one"}] });
        let card = render(Intent::Hook, &template, &profile(), "your product").unwrap();
        assert!(card.sections[0].fields.is_empty());
    }

    #[test]
    fn test_action_rows_always_attached() {
        let template = templates::fallback(Intent::Script);
        let card = render(Intent::Script, &template, &profile(), "your product").unwrap();

        assert_eq!(card.action_rows.len(), 2);
        assert_eq!(card.action_rows[0].len(), 3);
        assert_eq!(card.action_rows[0][0].id, "refine_script");
        assert_eq!(card.action_rows[1][0].id, "feedback_love");
    }

    #[test]
    fn test_ideas_empty_content_renders_error_section() {
        let template = json!({
            "creator_personalization": { "content_style": "anything" },
            "video_ideas": []
        });
        let card = render(Intent::Ideas, &template, &profile(), "your product").unwrap();

        assert_eq!(card.sections.len(), 2);
        assert!(card.sections[1].title.contains("Error"));
        assert_eq!(card.sections[1].color, RED);
        assert!(card.action_rows.is_empty());
    }

    #[test]
    fn test_every_fallback_renders() {
        for intent in Intent::CONTENT {
            let template = templates::fallback(intent);
            let card = render(intent, &template, &profile(), "your product")
                .unwrap_or_else(|e| panic!("{} fallback failed to render: {e}", intent.name()));
            assert!(card.sections.len() >= 2, "{} card too small", intent.name());
        }
    }

    #[test]
    fn test_analyze_card_is_about_your_content() {
        let template = templates::fallback(Intent::Analyze);
        let card = render(Intent::Analyze, &template, &profile(), "SkinGlow").unwrap();
        assert!(card.sections[0].title.contains("your content"));
    }

    #[test]
    fn test_script_missing_hook_is_content_error() {
        let template = json!({ "script_content": { "segments": [] } });
        let err = render(Intent::Script, &template, &profile(), "your product").unwrap_err();
        assert!(matches!(err, MuseError::Content(_)));
    }

    #[test]
    fn test_summary_sections_appended_when_present() {
        let template = json!({
            "hook_options": [{"text": "one"}],
            "success_factors": ["lands fast", "fits vertical"],
            "content_guidance": { "key_talking_points": ["name the problem"] }
        });
        let card = render(Intent::Hook, &template, &profile(), "your product").unwrap();

        let titles: Vec<&str> = card.sections.iter().map(|s| s.title.as_str()).collect();
        assert!(titles.iter().any(|t| t.contains("Perform Well")));
        assert!(titles.iter().any(|t| t.contains("Talking Points")));
        let success = card
            .sections
            .iter()
            .find(|s| s.title.contains("Perform Well"))
            .unwrap();
        assert!(success.body.contains("• lands fast"));
    }

    #[test]
    fn test_profile_card_fields() {
        let mut p = profile();
        p.brief = "Product: Lumo".into();
        p.last_intent = Some(Intent::Ideas);
        let card = render_profile(&p);

        let fields = &card.sections[0].fields;
        assert_eq!(fields[0].value, "@glowqueen");
        assert_eq!(fields[1].value, "Not set");
        assert_eq!(fields[2].value, "✅ Saved");
        assert_eq!(fields[3].value, "ideas");
        assert_eq!(card.action_rows[0][0].id, "update_info");
    }

    #[test]
    fn test_help_card_lists_all_seven_intents() {
        let card = render_help();
        assert_eq!(card.sections[0].fields.len(), 7);
        assert_eq!(card.action_rows[0].len(), 2);
    }

    #[test]
    fn test_score_helpers() {
        assert_eq!(score_emoji(9.0), "🔥");
        assert_eq!(score_emoji(6.5), "👍");
        assert_eq!(score_emoji(4.2), "😐");
        assert_eq!(score_emoji(1.0), "👎");
        assert_eq!(score_word(8.7), "Excellent");
        assert_eq!(score_word(5.6), "Average");
        assert_eq!(score_word(2.0), "Poor");
    }

    #[test]
    fn test_benchmark_body_includes_score_verdict() {
        let template = templates::fallback(Intent::Analyze);
        let card = render(Intent::Analyze, &template, &profile(), "ignored").unwrap();
        let hook_bench = card
            .sections
            .iter()
            .find(|s| s.title.contains("Hook"))
            .unwrap();
        assert!(hook_bench.body.contains("Strengths"));
        assert!(hook_bench.body.contains("Opportunities"));
    }
}
