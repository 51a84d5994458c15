//! Long-polling update loop and Channel trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use muse_core::{
    card::Card,
    error::MuseError,
    event::{ButtonClick, InboundEvent, IncomingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Remove a leading/embedded `@botname` mention.
///
/// Returns the cleaned text and whether a mention was present.
pub(crate) fn strip_mention(text: &str, bot_username: Option<&str>) -> (String, bool) {
    let Some(username) = bot_username.filter(|u| !u.is_empty()) else {
        return (text.trim().to_string(), false);
    };
    let token = format!("@{username}");
    if !text.contains(&token) {
        return (text.trim().to_string(), false);
    }
    let cleaned = text.replace(&token, " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (cleaned, true)
}

fn sender_name(user: &super::types::TgUser) -> String {
    if let Some(ref username) = user.username {
        format!("@{username}")
    } else if let Some(ref last) = user.last_name {
        format!("{} {last}", user.first_name)
    } else {
        user.first_name.clone()
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundEvent>, MuseError> {
        // Learn our own username for mention handling.
        match self.get_me().await {
            Ok(me) => {
                *self.bot_username.lock().await = me;
            }
            Err(e) => {
                warn!("telegram getMe failed, mention detection disabled: {e}");
            }
        }

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let bot_username = self.bot_username.clone();
        let last_update_id = self.last_update_id.clone();
        let answer_base = self.base_url.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!(
                    "{base_url}/getUpdates?timeout=30&allowed_updates=%5B%22message%22,%22callback_query%22%5D"
                );
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    if let Some(cq) = update.callback_query {
                        // Acknowledge so the client stops its spinner;
                        // best-effort, the click is processed regardless.
                        let ack = serde_json::json!({ "callback_query_id": cq.id });
                        if let Err(e) = client
                            .post(format!("{answer_base}/answerCallbackQuery"))
                            .json(&ack)
                            .send()
                            .await
                        {
                            debug!("answerCallbackQuery failed: {e}");
                        }

                        let Some(button_id) = cq.data.filter(|d| !d.is_empty()) else {
                            continue;
                        };
                        let chat_id = cq
                            .message
                            .as_ref()
                            .map(|m| m.chat.id)
                            .unwrap_or(cq.from.id);

                        let click = ButtonClick {
                            id: Uuid::new_v4(),
                            channel: "telegram".to_string(),
                            sender_id: cq.from.id.to_string(),
                            sender_name: Some(sender_name(&cq.from)),
                            button_id,
                            chat_id: chat_id.to_string(),
                            timestamp: chrono::Utc::now(),
                        };
                        if tx.send(InboundEvent::Button(click)).await.is_err() {
                            info!("telegram channel receiver dropped, stopping poll");
                            return;
                        }
                        continue;
                    }

                    let Some(msg) = update.message else { continue };
                    let Some(text) = msg.text else { continue };
                    let Some(user) = msg.from else { continue };

                    let username = bot_username.lock().await.clone();
                    let (text, mentioned) = strip_mention(&text, username.as_deref());
                    if text.is_empty() {
                        continue;
                    }

                    let is_direct = msg.chat.chat_type == "private";

                    let incoming = IncomingMessage {
                        id: Uuid::new_v4(),
                        channel: "telegram".to_string(),
                        sender_id: user.id.to_string(),
                        sender_name: Some(sender_name(&user)),
                        text,
                        timestamp: chrono::Utc::now(),
                        chat_id: msg.chat.id.to_string(),
                        is_direct,
                        mentioned,
                    };

                    if tx.send(InboundEvent::Message(incoming)).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_card(&self, target: &str, card: &Card) -> Result<(), MuseError> {
        let chat_id: i64 = target.parse().map_err(|e| {
            MuseError::Channel(format!("invalid telegram chat_id '{target}': {e}"))
        })?;
        self.send_card_to(chat_id, card).await
    }

    async fn send_text(&self, target: &str, text: &str) -> Result<(), MuseError> {
        let chat_id: i64 = target.parse().map_err(|e| {
            MuseError::Channel(format!("invalid telegram chat_id '{target}': {e}"))
        })?;
        self.send_text_to(chat_id, text, None).await
    }

    async fn send_typing(&self, target: &str) -> Result<(), MuseError> {
        let chat_id: i64 = target.parse().map_err(|e| {
            MuseError::Channel(format!("invalid telegram chat_id '{target}': {e}"))
        })?;
        self.send_chat_action(chat_id, "typing").await
    }

    async fn stop(&self) -> Result<(), MuseError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}
