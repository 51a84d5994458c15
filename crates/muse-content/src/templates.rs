//! Template store: bundled response documents with per-intent fallbacks.
//!
//! One JSON document per content intent, embedded at compile time and
//! deployed to `{data_dir}/templates/` on startup (never overwriting user
//! edits). `load` never fails: a missing or corrupt document degrades to a
//! hardcoded fallback whose shape satisfies that intent's renderer.

use muse_core::{intent::Intent, shellexpand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bundled template documents, one per content intent.
const BUNDLED: &[(Intent, &str, &str)] = &[
    (Intent::Hook, "hook.json", include_str!("../templates/hook.json")),
    (Intent::Script, "script.json", include_str!("../templates/script.json")),
    (Intent::Story, "story.json", include_str!("../templates/story.json")),
    (Intent::Ideas, "ideas.json", include_str!("../templates/ideas.json")),
    (Intent::Fix, "fix.json", include_str!("../templates/fix.json")),
    (Intent::Ready, "ready.json", include_str!("../templates/ready.json")),
    (Intent::Analyze, "analyze.json", include_str!("../templates/analyze.json")),
];

/// Deploy bundled templates to `{data_dir}/templates/`.
///
/// Never overwrites existing files so user edits are preserved.
pub fn install_bundled_templates(data_dir: &str) {
    let dir = PathBuf::from(shellexpand(data_dir)).join("templates");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("templates: failed to create {}: {e}", dir.display());
        return;
    }

    for (_, filename, content) in BUNDLED {
        let dest = dir.join(filename);
        if !dest.exists() {
            if let Err(e) = std::fs::write(&dest, content) {
                warn!("templates: failed to write {}: {e}", dest.display());
            } else {
                info!("templates: deployed bundled {filename}");
            }
        }
    }
}

/// Read-only store of response templates on disk.
#[derive(Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Store rooted at `{data_dir}/templates/`.
    pub fn new(data_dir: &str) -> Self {
        Self {
            dir: PathBuf::from(shellexpand(data_dir)).join("templates"),
        }
    }

    /// Store rooted at an explicit directory (used by tests).
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the template for an intent.
    ///
    /// Never raises: missing files and parse failures are logged and
    /// degrade to the intent's fallback document.
    pub fn load(&self, intent: Intent) -> Value {
        let Some(filename) = template_file(intent) else {
            warn!("no template mapping for intent '{}'", intent.name());
            return fallback(intent);
        };
        let path = self.dir.join(filename);
        match read_template(&path) {
            Ok(value) => value,
            Err(cause) => {
                warn!(
                    "template for '{}' unavailable ({cause}), using fallback",
                    intent.name()
                );
                fallback(intent)
            }
        }
    }
}

fn template_file(intent: Intent) -> Option<&'static str> {
    BUNDLED
        .iter()
        .find(|(i, _, _)| *i == intent)
        .map(|(_, filename, _)| *filename)
}

fn read_template(path: &Path) -> Result<Value, String> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| format!("read {} failed: {e}", path.display()))?;
    serde_json::from_str(&data).map_err(|e| format!("parse {} failed: {e}", path.display()))
}

/// Hardcoded fallback document for an intent.
///
/// Each fallback carries a personalization block and at least one
/// primary-content entry so every renderer's minimum shape holds.
pub fn fallback(intent: Intent) -> Value {
    let personalization = json!({
        "content_style": "Your authentic voice is your strongest asset",
        "audience_insight": "Your audience appreciates your honesty and expertise"
    });

    match intent {
        Intent::Script => json!({
            "creator_personalization": personalization,
            "script_content": {
                "hook": "Here's the one thing nobody tells you about this.",
                "segments": [
                    {
                        "type": "intro",
                        "script": "Start by showing the product in your own routine.",
                        "visual_direction": "Natural light, handheld"
                    }
                ]
            },
            "success_factors": ["This is a fallback response"]
        }),
        Intent::Story => json!({
            "creator_personalization": personalization,
            "story_content": {
                "narrative_theme": "Honest transformation",
                "hook": "I almost gave up before I found what actually worked.",
                "segments": [
                    {
                        "type": "discovery",
                        "script": "Share the moment things changed for you.",
                        "emotional_tone": "Hopeful"
                    }
                ]
            },
            "authenticity_boosters": ["This is a fallback response"]
        }),
        Intent::Ideas => json!({
            "creator_personalization": personalization,
            "video_ideas": [
                {
                    "concept": "Day-in-the-life placeholder",
                    "hook": "Default idea - the full template was unavailable",
                    "structure": ["Open on the problem", "Show your solution"],
                    "key_visuals": ["Close-up product shot"]
                }
            ]
        }),
        Intent::Fix => json!({
            "creator_personalization": personalization,
            "improvement_plan": {
                "hook_revision": {
                    "original": "My original opening",
                    "improved": "A sharper opening that names the problem in 2 seconds",
                    "explanation": "This is a fallback response"
                },
                "structure_improvements": [
                    {
                        "issue": "Template unavailable",
                        "fix": "Retry later for tailored fixes",
                        "example": "This is a fallback response"
                    }
                ],
                "cta_improvements": {
                    "original": "Follow for more",
                    "improved": "Comment 'GLOW' and I'll send you the full routine",
                    "explanation": "More engaging and action-oriented"
                }
            },
            "revised_script": "This is a fallback response.",
            "success_metrics": {
                "expected_improvement": "Baseline guidance only",
                "primary_indicator": "Watch time"
            }
        }),
        Intent::Ready => json!({
            "creator_personalization": personalization,
            "production_package": {
                "concept_overview": "Fallback shoot plan",
                "hook_options": [
                    { "text": "Default hook text - template unavailable" }
                ],
                "shot_list": [
                    {
                        "shot_number": 1,
                        "description": "Product close-up",
                        "duration": "3s",
                        "camera_angle": "Eye level"
                    }
                ],
                "script": {
                    "hook": "Default hook text - template unavailable",
                    "body": "This is a fallback response."
                }
            },
            "success_factors": ["This is a fallback response"]
        }),
        Intent::Analyze => json!({
            "creator_personalization": personalization,
            "performance_summary": {
                "overall_score": 5,
                "potential_improvement": "Unavailable - template could not be loaded",
                "strongest_element": "Consistency",
                "focus_area": "Hook"
            },
            "benchmark_data": {
                "hook": {
                    "your_score": 5,
                    "industry_avg": 5,
                    "percentile": 50,
                    "strengths": ["This is a fallback response"],
                    "opportunities": ["Retry later for a full analysis"]
                }
            }
        }),
        // Hook is also the shape handed out for any non-content intent that
        // slips through; its block satisfies the most renderers.
        _ => json!({
            "creator_personalization": personalization,
            "hook_options": [
                {
                    "text": "Default hook text - template unavailable",
                    "style": "Default style",
                    "predicted_engagement": "Average",
                    "strength": "This is a fallback response as the template could not be loaded"
                }
            ],
            "success_factors": ["This is a fallback response"],
            "content_guidance": {
                "key_talking_points": ["Point 1", "Point 2", "Point 3"]
            }
        }),
    }
}
