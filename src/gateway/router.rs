//! Message routing: gate, classify, update the session, reply.
//!
//! The user always receives a reply — the intended card, a clarification
//! prompt, or an apology. Renderer failures never take the process down.

use super::Gateway;
use muse_content::{render, render_failure, render_help, render_profile};
use muse_core::{
    card::Card,
    error::MuseError,
    event::IncomingMessage,
    intent::{classify, detect_update_field, extract_update_value, Intent},
    profile::UserProfile,
    text::{extract_product_mention, extract_product_name, extract_url, PRODUCT_PLACEHOLDER},
};
use muse_images::{augment, plans_for};
use tracing::{error, info};

impl Gateway {
    /// Whether the bot should answer this message at all: direct messages,
    /// explicit mentions, and allow-listed chats only.
    fn should_respond(&self, msg: &IncomingMessage) -> bool {
        if msg.is_direct || msg.mentioned {
            return true;
        }
        msg.chat_id
            .parse::<i64>()
            .map(|id| self.allowed_chats.contains(&id))
            .unwrap_or(false)
    }

    pub(super) async fn handle_message(&self, msg: IncomingMessage) {
        if !self.should_respond(&msg) {
            return;
        }

        let intent = classify(&msg.text);
        info!(
            "[{}] message from {} | intent: {}",
            msg.channel,
            msg.sender_id,
            intent.name()
        );

        let default_handle = msg
            .sender_name
            .clone()
            .unwrap_or_else(|| msg.sender_id.clone());
        let profile = self.sessions.get_or_create(&msg.sender_id, &default_handle).await;
        self.sessions.touch(&msg.sender_id).await;
        if intent != Intent::None {
            self.sessions.set_last_intent(&msg.sender_id, intent).await;
        }

        let result = match intent {
            Intent::Update => self.handle_update(&msg, &default_handle).await,
            Intent::Profile => {
                // Re-read so the card reflects this event's own updates.
                let current = self.sessions.get(&msg.sender_id).await.unwrap_or(profile);
                self.send_card(&msg.channel, &msg.chat_id, &render_profile(&current))
                    .await
            }
            Intent::None => {
                self.send_card(&msg.channel, &msg.chat_id, &render_help())
                    .await
            }
            Intent::Analyze => self.handle_analyze(&msg, &profile).await,
            _ => {
                self.send_content(&msg.channel, &msg.chat_id, intent, &profile, Some(&msg.text))
                    .await
            }
        };

        if let Err(e) = result {
            error!("failed to handle '{}' message: {e}", intent.name());
            let apology = render_failure(intent, &e.to_string());
            if let Err(send_err) = self.send_card(&msg.channel, &msg.chat_id, &apology).await {
                error!("failed to deliver apology: {send_err}");
            }
        }
    }

    /// Update-intent path: identify the field and value, store, confirm.
    /// Missing pieces get a clarification prompt, not a write.
    async fn handle_update(
        &self,
        msg: &IncomingMessage,
        default_handle: &str,
    ) -> Result<(), MuseError> {
        let Some(field) = detect_update_field(&msg.text) else {
            return self
                .send_text(
                    &msg.channel,
                    &msg.chat_id,
                    "❓ Not sure what you want to update. You can update your TikTok handle, \
                     Instagram handle, or product brief.",
                )
                .await;
        };

        let Some(value) = extract_update_value(&msg.text) else {
            return self
                .send_text(
                    &msg.channel,
                    &msg.chat_id,
                    "❓ Please provide a value to update. For example: \
                     'Update my TikTok handle to @myhandle'",
                )
                .await;
        };

        self.sessions
            .update(&msg.sender_id, default_handle, field, &value)
            .await;
        self.send_text(
            &msg.channel,
            &msg.chat_id,
            &format!("✅ Updated your {} to: {value}", field.display_name()),
        )
        .await
    }

    /// Analyze requires a video URL; without one the reply is a
    /// clarification, not an error.
    async fn handle_analyze(
        &self,
        msg: &IncomingMessage,
        profile: &UserProfile,
    ) -> Result<(), MuseError> {
        if extract_url(&msg.text).is_none() {
            return self
                .send_text(
                    &msg.channel,
                    &msg.chat_id,
                    "❓ Please provide a video URL for me to analyze. For example: \
                     'Analyze this video: https://tiktok.com/...'",
                )
                .await;
        }
        self.send_content(&msg.channel, &msg.chat_id, Intent::Analyze, profile, Some(&msg.text))
            .await
    }

    /// Render and deliver a content card: template → card → optional image
    /// augmentation → channel.
    pub(super) async fn send_content(
        &self,
        channel: &str,
        chat_id: &str,
        intent: Intent,
        profile: &UserProfile,
        source_text: Option<&str>,
    ) -> Result<(), MuseError> {
        if let Some(ch) = self.channels.get(channel) {
            let _ = ch.send_typing(chat_id).await;
        }

        let template = self.templates.load(intent);

        let mut product = extract_product_name(&profile.brief);
        if product == PRODUCT_PLACEHOLDER {
            if let Some(mention) = source_text.and_then(extract_product_mention) {
                product = mention;
            }
        }

        let mut card = render(intent, &template, profile, &product)?;

        if let Some(ref provider) = self.images {
            if matches!(intent, Intent::Script | Intent::Ideas) {
                let plans = plans_for(intent, &template, &product);
                augment(
                    &mut card,
                    &plans,
                    provider.as_ref(),
                    &self.image_dir,
                    &self.image_size,
                )
                .await;
            }
        }

        self.send_card(channel, chat_id, &card).await
    }

    pub(super) async fn send_card(
        &self,
        channel: &str,
        chat_id: &str,
        card: &Card,
    ) -> Result<(), MuseError> {
        let ch = self
            .channels
            .get(channel)
            .ok_or_else(|| MuseError::Channel(format!("no channel '{channel}'")))?;
        ch.send_card(chat_id, card).await
    }

    pub(super) async fn send_text(
        &self,
        channel: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<(), MuseError> {
        let ch = self
            .channels
            .get(channel)
            .ok_or_else(|| MuseError::Channel(format!("no channel '{channel}'")))?;
        ch.send_text(chat_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use muse_content::TemplateStore;
    use muse_core::config::{Config, ImageConfig, MuseConfig, SessionConfig, TelegramConfig};
    use muse_core::event::InboundEvent;
    use muse_core::traits::Channel;
    use muse_session::SessionStore;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{mpsc, Mutex};
    use uuid::Uuid;

    /// What the mock channel was asked to deliver.
    #[derive(Debug, Clone)]
    enum Sent {
        Card(Vec<String>, Vec<Vec<&'static str>>),
        Text(String),
    }

    struct MockChannel {
        sent: Arc<Mutex<Vec<Sent>>>,
    }

    #[async_trait]
    impl Channel for MockChannel {
        fn name(&self) -> &str {
            "mock"
        }

        async fn start(&self) -> Result<mpsc::Receiver<InboundEvent>, MuseError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }

        async fn send_card(&self, _target: &str, card: &Card) -> Result<(), MuseError> {
            let titles = card.sections.iter().map(|s| s.title.clone()).collect();
            let actions = card
                .action_rows
                .iter()
                .map(|row| row.iter().map(|a| a.id).collect())
                .collect();
            self.sent.lock().await.push(Sent::Card(titles, actions));
            Ok(())
        }

        async fn send_text(&self, _target: &str, text: &str) -> Result<(), MuseError> {
            self.sent.lock().await.push(Sent::Text(text.to_string()));
            Ok(())
        }

        async fn stop(&self) -> Result<(), MuseError> {
            Ok(())
        }
    }

    fn test_gateway(name: &str) -> (Arc<Gateway>, Arc<Mutex<Vec<Sent>>>, std::path::PathBuf) {
        let session_file = std::env::temp_dir().join(format!("__muse_router_{name}.json"));
        let _ = std::fs::remove_file(&session_file);

        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
        channels.insert("mock".into(), Arc::new(MockChannel { sent: sent.clone() }));

        let config = Config {
            muse: MuseConfig::default(),
            channel: muse_core::config::ChannelConfig {
                telegram: Some(TelegramConfig {
                    enabled: true,
                    bot_token: "t".into(),
                    allowed_chats: vec![99],
                }),
            },
            session: SessionConfig {
                file: session_file.to_string_lossy().into_owned(),
                retention_days: 7,
            },
            images: ImageConfig {
                enabled: false,
                ..ImageConfig::default()
            },
        };

        // Template dir does not exist: every load degrades to fallback,
        // which is exactly what these tests want.
        let templates = TemplateStore::at(std::env::temp_dir().join("__muse_router_no_templates"));
        let sessions = SessionStore::load(session_file.to_str().unwrap());
        let gw = Arc::new(Gateway::new(channels, sessions, templates, None, &config));
        (gw, sent, session_file)
    }

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage {
            id: Uuid::new_v4(),
            channel: "mock".into(),
            sender_id: "u1".into(),
            sender_name: Some("Alice".into()),
            text: text.into(),
            timestamp: chrono::Utc::now(),
            chat_id: "7".into(),
            is_direct: true,
            mentioned: false,
        }
    }

    #[tokio::test]
    async fn test_first_time_hook_request_end_to_end() {
        let (gw, sent, session_file) = test_gateway("hook");

        gw.handle_message(message("give me a hook for my new SkinGlow serum"))
            .await;

        // Profile created and seeded with the transport display name.
        let profile = gw.sessions.get("u1").await.unwrap();
        assert_eq!(profile.primary_handle, "Alice");
        assert_eq!(profile.last_intent, Some(Intent::Hook));

        // The card header names the product pulled from the message.
        let sent = sent.lock().await;
        let Sent::Card(titles, actions) = &sent[0] else {
            panic!("expected a card, got {:?}", sent[0]);
        };
        assert!(titles[0].contains("SkinGlow"));
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0][0], "more_hooks");

        let _ = std::fs::remove_file(session_file);
    }

    #[tokio::test]
    async fn test_update_flow_echoes_new_value() {
        let (gw, sent, session_file) = test_gateway("update");

        gw.handle_message(message("update my tiktok to @newhandle")).await;

        let profile = gw.sessions.get("u1").await.unwrap();
        assert_eq!(profile.primary_handle, "@newhandle");

        let sent = sent.lock().await;
        let Sent::Text(reply) = &sent[0] else {
            panic!("expected text, got {:?}", sent[0]);
        };
        assert!(reply.contains("@newhandle"));
        assert!(reply.contains("TikTok handle"));

        let _ = std::fs::remove_file(session_file);
    }

    #[tokio::test]
    async fn test_update_without_value_asks_for_one() {
        let (gw, sent, session_file) = test_gateway("update_novalue");

        gw.handle_message(message("update my tiktok")).await;

        let sent = sent.lock().await;
        let Sent::Text(reply) = &sent[0] else {
            panic!("expected text, got {:?}", sent[0]);
        };
        assert!(reply.contains("provide a value"));

        let _ = std::fs::remove_file(session_file);
    }

    #[tokio::test]
    async fn test_analyze_without_url_asks_for_one() {
        let (gw, sent, session_file) = test_gateway("analyze_nourl");

        gw.handle_message(message("analyze my last video")).await;

        let sent = sent.lock().await;
        let Sent::Text(reply) = &sent[0] else {
            panic!("expected text, got {:?}", sent[0]);
        };
        assert!(reply.contains("video URL"));

        let _ = std::fs::remove_file(session_file);
    }

    #[tokio::test]
    async fn test_unrecognized_text_gets_help_card() {
        let (gw, sent, session_file) = test_gateway("help");

        gw.handle_message(message("good morning")).await;

        let sent = sent.lock().await;
        let Sent::Card(titles, _) = &sent[0] else {
            panic!("expected a card, got {:?}", sent[0]);
        };
        assert!(titles[0].contains("Creator Success Coach"));

        let _ = std::fs::remove_file(session_file);
    }

    #[tokio::test]
    async fn test_unmentioned_group_message_is_ignored_unless_allowed() {
        let (gw, sent, session_file) = test_gateway("gating");

        let mut msg = message("give me a hook");
        msg.is_direct = false;
        msg.chat_id = "123".into(); // not on the allow-list
        gw.handle_message(msg).await;
        assert!(sent.lock().await.is_empty());

        let mut msg = message("give me a hook");
        msg.is_direct = false;
        msg.chat_id = "99".into(); // allow-listed
        gw.handle_message(msg).await;
        assert_eq!(sent.lock().await.len(), 1);

        let _ = std::fs::remove_file(session_file);
    }

    #[tokio::test]
    async fn test_profile_card_after_updates() {
        let (gw, sent, session_file) = test_gateway("profile");

        gw.handle_message(message("update my instagram to @alice.ig")).await;
        gw.handle_message(message("what do you know about me")).await;

        let sent = sent.lock().await;
        let Sent::Card(titles, actions) = &sent[1] else {
            panic!("expected a card, got {:?}", sent[1]);
        };
        assert!(titles[0].contains("Creator Profile"));
        assert_eq!(actions[0][0], "update_info");

        let _ = std::fs::remove_file(session_file);
    }
}
