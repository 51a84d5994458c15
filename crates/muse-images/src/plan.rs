//! Derives image plans (prompt + target section) from template content.
//!
//! Only `script` and `ideas` cards are illustrated. Section indexing
//! mirrors the renderer: header at 0, hook/featured concept at 1,
//! segments/scenes from 2.

use muse_core::intent::Intent;
use serde_json::Value;

use crate::prompt::build_prompt;

/// Hard cap on provider calls per request.
pub const MAX_IMAGES_PER_REQUEST: usize = 3;

/// Ideas scenes rendered by the card; plans never target unrendered scenes.
const MAX_IDEA_SCENES: usize = 4;

/// One planned image: where it goes and what to ask the provider for.
#[derive(Debug, Clone)]
pub struct ImagePlan {
    /// Card section the image attaches to.
    pub section_index: usize,
    pub prompt: String,
    /// Stem for the saved file name.
    pub filename_stem: String,
}

/// Derive up to [`MAX_IMAGES_PER_REQUEST`] image plans for an intent.
///
/// Intents other than `script` and `ideas` produce no plans.
pub fn plans_for(intent: Intent, template: &Value, product: &str) -> Vec<ImagePlan> {
    let mut plans = match intent {
        Intent::Script => script_plans(template, product),
        Intent::Ideas => ideas_plans(template, product),
        _ => Vec::new(),
    };
    plans.truncate(MAX_IMAGES_PER_REQUEST);
    plans
}

fn cue<'a>(segment: &'a Value, script_key: &str) -> Option<&'a str> {
    segment
        .get("visual_direction")
        .and_then(Value::as_str)
        .or_else(|| segment.get(script_key).and_then(Value::as_str))
}

fn script_plans(template: &Value, product: &str) -> Vec<ImagePlan> {
    let mut plans = Vec::new();

    // Hero image for the opening hook.
    if let Some(hook) = template.pointer("/script_content/hook").and_then(Value::as_str) {
        plans.push(ImagePlan {
            section_index: 1,
            prompt: build_prompt(hook, product, "cinematic"),
            filename_stem: "script_hook".into(),
        });
    }

    let segments = template
        .pointer("/script_content/segments")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    // First and last segments when more than two exist, otherwise all.
    let picks: Vec<usize> = if segments.len() > 2 {
        vec![0, segments.len() - 1]
    } else {
        (0..segments.len()).collect()
    };

    for index in picks {
        if let Some(cue) = cue(&segments[index], "script") {
            plans.push(ImagePlan {
                section_index: 2 + index,
                prompt: build_prompt(cue, product, "tiktok"),
                filename_stem: format!("script_segment_{index}"),
            });
        }
    }

    plans
}

fn ideas_plans(template: &Value, product: &str) -> Vec<ImagePlan> {
    let Some(main) = template
        .pointer("/video_ideas/0")
        .filter(|idea| !idea.is_null())
    else {
        return Vec::new();
    };

    let mut plans = Vec::new();

    let visuals = main
        .get("key_visuals")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    // Hero image for the featured concept.
    if let Some(hook) = main.get("hook").and_then(Value::as_str) {
        let cue = visuals
            .first()
            .and_then(Value::as_str)
            .unwrap_or(hook);
        plans.push(ImagePlan {
            section_index: 1,
            prompt: build_prompt(cue, product, "tiktok"),
            filename_stem: "idea_concept".into(),
        });
    }

    let structure = main
        .get("structure")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if structure.is_empty() {
        return plans;
    }

    // First and last scene when more than two exist, otherwise just the
    // first — and only scenes the card actually renders.
    let rendered = structure.len().min(MAX_IDEA_SCENES);
    let picks: Vec<usize> = if structure.len() > 2 {
        vec![0, structure.len() - 1]
    } else {
        vec![0]
    };

    for index in picks {
        if index >= rendered {
            continue;
        }
        let scene_cue = visuals
            .get(index % visuals.len().max(1))
            .and_then(Value::as_str)
            .or_else(|| structure[index].as_str());
        if let Some(cue) = scene_cue {
            plans.push(ImagePlan {
                section_index: 2 + index,
                prompt: build_prompt(cue, product, "tiktok"),
                filename_stem: format!("idea_scene_{index}"),
            });
        }
    }

    plans
}
