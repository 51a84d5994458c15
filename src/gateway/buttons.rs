//! Button-click handling.
//!
//! Feedback and save buttons get immediate acknowledgements. The
//! regenerate family acknowledges right away, then delivers a refreshed
//! card through a tracked job (see `jobs`), so a second click replaces
//! the pending regeneration instead of stacking another one.

use super::Gateway;
use muse_content::render_update_help;
use muse_core::{error::MuseError, event::ButtonClick, intent::Intent, profile::UserProfile};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// What a regenerate-family button does after its acknowledgement.
enum RegenPayload {
    /// Re-render and send the intent's content card.
    Content(Intent),
    /// Send a fixed follow-up message.
    Text(&'static str),
}

struct RegenSpec {
    ack: &'static str,
    delay: Duration,
    payload: RegenPayload,
}

/// Regenerate-family buttons: acknowledgement, delay, then payload.
fn regen_spec(button_id: &str) -> Option<RegenSpec> {
    let spec = |ack, secs, payload| {
        Some(RegenSpec {
            ack,
            delay: Duration::from_secs(secs),
            payload,
        })
    };

    match button_id {
        "more_hooks" => spec(
            "🔄 Generating more hook options for you...",
            2,
            RegenPayload::Content(Intent::Hook),
        ),
        "creator_focus" => spec(
            "✏️ Adjusting the content to focus more on your unique creator style...",
            2,
            RegenPayload::Content(Intent::Hook),
        ),
        "refine_script" => spec(
            "✏️ Refining your script with more audience-focused messaging...",
            2,
            RegenPayload::Content(Intent::Script),
        ),
        "add_visuals" => spec(
            "🎨 Adding more detailed visual notes to your script...",
            2,
            RegenPayload::Content(Intent::Script),
        ),
        "more_emotional" => spec(
            "❤️ Making your story more emotional and impactful...",
            2,
            RegenPayload::Content(Intent::Story),
        ),
        "more_authentic" => spec(
            "✅ Enhancing your story's authenticity...",
            2,
            RegenPayload::Content(Intent::Story),
        ),
        "more_ideas" => spec(
            "🔄 Generating more creative video ideas...",
            2,
            RegenPayload::Content(Intent::Ideas),
        ),
        "trending_ideas" => spec(
            "📈 Finding trending content ideas for your niche...",
            2,
            RegenPayload::Content(Intent::Ideas),
        ),
        "explain_more" => spec(
            "❓ Providing more detailed explanations of the suggested fixes...",
            2,
            RegenPayload::Content(Intent::Fix),
        ),
        "fix_issues" => spec(
            "🔧 Creating a fix plan for the identified issues...",
            2,
            RegenPayload::Content(Intent::Fix),
        ),
        "refine_shots" => spec(
            "🎯 Refining your shot list for optimal performance...",
            2,
            RegenPayload::Content(Intent::Ready),
        ),
        "deep_insights" => spec(
            "🔍 Generating deeper insights from your video analysis...",
            3,
            RegenPayload::Content(Intent::Analyze),
        ),
        "apply_fixes" => spec(
            "🛠️ Applying all suggested fixes to your video...",
            3,
            RegenPayload::Text(
                "✅ All fixes have been applied to your video! You can now download the \
                 improved version from your dashboard.",
            ),
        ),
        "download_package" => spec(
            "📥 Preparing your ready-to-shoot package for download...",
            2,
            RegenPayload::Text(
                "✅ Your ready-to-shoot package has been prepared! You can download it \
                 from your dashboard.",
            ),
        ),
        "calendar_add" => spec(
            "📅 Adding this shoot to your content calendar...",
            2,
            RegenPayload::Text(
                "✅ Added to your content calendar for next week! You'll receive \
                 reminders 2 days before the shoot.",
            ),
        ),
        _ => None,
    }
}

impl Gateway {
    pub(super) async fn handle_click(self: Arc<Self>, click: ButtonClick) {
        info!(
            "[{}] button '{}' from {}",
            click.channel, click.button_id, click.sender_id
        );

        let default_handle = click
            .sender_name
            .clone()
            .unwrap_or_else(|| click.sender_id.clone());
        let profile = self
            .sessions
            .get_or_create(&click.sender_id, &default_handle)
            .await;
        self.sessions.touch(&click.sender_id).await;

        if let Err(e) = self.clone().dispatch_button(&click, &profile).await {
            error!("button '{}' failed: {e}", click.button_id);
            let _ = self
                .send_text(
                    &click.channel,
                    &click.chat_id,
                    "❌ Sorry, I encountered an error. Please try again.",
                )
                .await;
        }
    }

    async fn dispatch_button(
        self: Arc<Self>,
        click: &ButtonClick,
        profile: &UserProfile,
    ) -> Result<(), MuseError> {
        let id = click.button_id.as_str();

        if let Some(feedback) = id.strip_prefix("feedback_") {
            let reply = match feedback {
                "love" => "❤️ I'm so glad you loved it! Your feedback helps me improve.",
                "meh" => "😐 Thanks for your honest feedback. I'll work on making this better.",
                "help" => "🆘 I'm here to help! Please tell me what you need assistance with.",
                _ => "Thanks for the feedback!",
            };
            return self.send_text(&click.channel, &click.chat_id, reply).await;
        }

        if id == "update_info" {
            return self
                .send_card(&click.channel, &click.chat_id, &render_update_help())
                .await;
        }

        if id.starts_with("save_") {
            return self
                .send_text(
                    &click.channel,
                    &click.chat_id,
                    "💾 I've saved this to your favorites! You can access it anytime \
                     from your dashboard.",
                )
                .await;
        }

        if let Some(example) = id.strip_prefix("example_") {
            let intent = match example {
                "script" => Intent::Script,
                _ => Intent::Hook,
            };
            return self
                .send_content(&click.channel, &click.chat_id, intent, profile, None)
                .await;
        }

        if let Some(spec) = regen_spec(id) {
            self.send_text(&click.channel, &click.chat_id, spec.ack).await?;

            let gw = self.clone();
            let channel = click.channel.clone();
            let chat_id = click.chat_id.clone();
            let profile = profile.clone();
            let button_id = click.button_id.clone();
            let key = format!("{}:{}", click.channel, click.sender_id);

            self.jobs
                .schedule(key, spec.delay, async move {
                    let result = match spec.payload {
                        RegenPayload::Content(intent) => {
                            gw.send_content(&channel, &chat_id, intent, &profile, None).await
                        }
                        RegenPayload::Text(text) => gw.send_text(&channel, &chat_id, text).await,
                    };
                    if let Err(e) = result {
                        error!("regen job for '{button_id}' failed: {e}");
                    }
                })
                .await;
            return Ok(());
        }

        self.send_text(
            &click.channel,
            &click.chat_id,
            "✅ Your request has been received! I'll have that ready for you shortly.",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regen_specs_cover_all_card_actions() {
        // Every non-save action id on the seven content layouts must be a
        // regenerate job; save and feedback buttons answer immediately.
        for intent in Intent::CONTENT {
            let layout = muse_content::layout::layout_for(intent).unwrap();
            for action in &layout.actions {
                if action.id.starts_with("save_") {
                    assert!(regen_spec(action.id).is_none());
                } else {
                    assert!(
                        regen_spec(action.id).is_some(),
                        "no regen spec for '{}'",
                        action.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_regen_spec_payload_targets() {
        let spec = regen_spec("more_hooks").unwrap();
        assert!(matches!(spec.payload, RegenPayload::Content(Intent::Hook)));
        let spec = regen_spec("deep_insights").unwrap();
        assert!(matches!(spec.payload, RegenPayload::Content(Intent::Analyze)));
        let spec = regen_spec("calendar_add").unwrap();
        assert!(matches!(spec.payload, RegenPayload::Text(_)));
        assert!(regen_spec("feedback_love").is_none());
        assert!(regen_spec("unknown_button").is_none());
    }
}
