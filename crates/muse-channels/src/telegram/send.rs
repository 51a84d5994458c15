//! Message sending: card rendering, text, photos, and chat actions.

use super::TelegramChannel;
use crate::utils::split_message;
use muse_core::{
    card::{Action, Card, Section},
    error::MuseError,
};
use serde_json::Value;
use tracing::warn;

/// Telegram message length limit.
const MAX_MESSAGE_LEN: usize = 4096;

/// Telegram photo caption limit.
const MAX_CAPTION_LEN: usize = 1024;

/// Render one section as Markdown.
pub(crate) fn format_section(section: &Section) -> String {
    let mut out = format!("*{}*\n", section.title);
    if !section.body.is_empty() {
        out.push_str(&section.body);
        out.push('\n');
    }
    for field in &section.fields {
        out.push_str(&format!("• *{}:* {}\n", field.name, field.value));
    }
    out
}

/// Build `reply_markup` for a card's action rows, if any.
pub(crate) fn inline_keyboard(rows: &[Vec<Action>]) -> Option<Value> {
    if rows.is_empty() || rows.iter().all(|row| row.is_empty()) {
        return None;
    }
    let keyboard: Vec<Vec<Value>> = rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            row.iter()
                .map(|action| {
                    let text = if action.emoji.is_empty() {
                        action.label.to_string()
                    } else {
                        format!("{} {}", action.emoji, action.label)
                    };
                    serde_json::json!({ "text": text, "callback_data": action.id })
                })
                .collect()
        })
        .collect();
    Some(serde_json::json!({ "inline_keyboard": keyboard }))
}

impl TelegramChannel {
    /// Render a card: text sections batched into Markdown messages, image
    /// sections sent as photos, the inline keyboard on the final message.
    pub(crate) async fn send_card_to(&self, chat_id: i64, card: &Card) -> Result<(), MuseError> {
        let keyboard = inline_keyboard(&card.action_rows);
        let mut pending = String::new();

        for section in &card.sections {
            let Some(ref image) = section.image else {
                pending.push_str(&format_section(section));
                pending.push('\n');
                continue;
            };

            // Flush accumulated text so sections stay in order.
            if !pending.is_empty() {
                self.send_text_to(chat_id, pending.trim_end(), None).await?;
                pending.clear();
            }

            let caption = format!("{}\n{}", section.title, section.body);
            let caption = split_message(&caption, MAX_CAPTION_LEN)[0];
            match std::fs::read(&image.path) {
                Ok(bytes) => {
                    if let Err(e) = self.send_photo_bytes(chat_id, &bytes, caption).await {
                        warn!("sendPhoto failed for {}, falling back to text: {e}", image.filename);
                        pending.push_str(&format_section(section));
                        pending.push('\n');
                    } else if !section.fields.is_empty() {
                        // Fields don't fit a caption; keep them in the flow.
                        for field in &section.fields {
                            pending.push_str(&format!("• *{}:* {}\n", field.name, field.value));
                        }
                        pending.push('\n');
                    }
                }
                Err(e) => {
                    warn!("failed to read generated image {}: {e}", image.filename);
                    pending.push_str(&format_section(section));
                    pending.push('\n');
                }
            }
        }

        if let Some(ref footer) = card.footer {
            pending.push_str(&format!("_{footer}_\n"));
        }

        let text = pending.trim_end().to_string();
        if text.is_empty() {
            // Keyboard still needs a carrier message.
            if keyboard.is_some() {
                return self
                    .send_text_to(chat_id, &card.fallback_text, keyboard.as_ref())
                    .await;
            }
            return Ok(());
        }
        self.send_text_to(chat_id, &text, keyboard.as_ref()).await
    }

    /// Send a text message, chunked to the platform limit. Markdown parse
    /// failures retry as plain text. `reply_markup` rides the last chunk.
    pub(crate) async fn send_text_to(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&Value>,
    ) -> Result<(), MuseError> {
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        let last = chunks.len() - 1;

        for (i, chunk) in chunks.iter().enumerate() {
            let url = format!("{}/sendMessage", self.base_url);
            let mut body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
                "parse_mode": "Markdown",
            });
            if i == last {
                if let Some(markup) = reply_markup {
                    body["reply_markup"] = markup.clone();
                }
            }

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| MuseError::Channel(format!("telegram send failed: {e}")))?;

            let status = resp.status();
            if !status.is_success() {
                let error_text = resp.text().await.unwrap_or_default();
                if error_text.contains("can't parse entities") {
                    warn!("Markdown parse failed, retrying as plain text: {error_text}");
                    let mut plain_body = serde_json::json!({
                        "chat_id": chat_id,
                        "text": chunk,
                    });
                    if i == last {
                        if let Some(markup) = reply_markup {
                            plain_body["reply_markup"] = markup.clone();
                        }
                    }
                    let plain_resp = self
                        .client
                        .post(format!("{}/sendMessage", self.base_url))
                        .json(&plain_body)
                        .send()
                        .await
                        .map_err(|e| {
                            MuseError::Channel(format!("telegram send (plain) failed: {e}"))
                        })?;
                    if !plain_resp.status().is_success() {
                        let plain_err = plain_resp.text().await.unwrap_or_default();
                        return Err(MuseError::Channel(format!(
                            "telegram send (plain fallback) failed: {plain_err}"
                        )));
                    }
                } else {
                    return Err(MuseError::Channel(format!(
                        "telegram send failed ({status}): {error_text}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Send a photo (PNG bytes) with a caption to a chat.
    pub(crate) async fn send_photo_bytes(
        &self,
        chat_id: i64,
        image: &[u8],
        caption: &str,
    ) -> Result<(), MuseError> {
        let url = format!("{}/sendPhoto", self.base_url);

        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name("photo.png")
            .mime_str("image/png")
            .map_err(|e| MuseError::Channel(format!("mime error: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", part);

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MuseError::Channel(format!("telegram sendPhoto failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(MuseError::Channel(format!(
                "telegram sendPhoto failed ({status}): {error_text}"
            )));
        }

        Ok(())
    }

    /// Send a chat action (e.g. "typing") to a chat.
    pub(crate) async fn send_chat_action(
        &self,
        chat_id: i64,
        action: &str,
    ) -> Result<(), MuseError> {
        let url = format!("{}/sendChatAction", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": action,
        });

        self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MuseError::Channel(format!("telegram sendChatAction failed: {e}")))?;

        Ok(())
    }

    /// Fetch the bot's own username via `getMe`.
    pub(crate) async fn get_me(&self) -> Result<Option<String>, MuseError> {
        let url = format!("{}/getMe", self.base_url);
        let resp: super::types::TgResponse<super::types::TgMe> = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MuseError::Channel(format!("telegram getMe failed: {e}")))?
            .json()
            .await
            .map_err(|e| MuseError::Channel(format!("telegram getMe parse failed: {e}")))?;

        Ok(resp.result.and_then(|me| me.username))
    }
}
