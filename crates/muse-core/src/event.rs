use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound event from a channel: a text message or a button click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InboundEvent {
    Message(IncomingMessage),
    Button(ButtonClick),
}

impl InboundEvent {
    /// Channel name the event arrived on.
    pub fn channel(&self) -> &str {
        match self {
            Self::Message(m) => &m.channel,
            Self::Button(b) => &b.channel,
        }
    }

    /// Platform-specific sender ID.
    pub fn sender_id(&self) -> &str {
        match self {
            Self::Message(m) => &m.sender_id,
            Self::Button(b) => &b.sender_id,
        }
    }
}

/// An incoming text message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific user ID.
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text, with any bot mention already stripped.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. chat_id).
    pub chat_id: String,
    /// Whether this arrived as a direct (one-to-one) message.
    pub is_direct: bool,
    /// Whether the bot was explicitly mentioned.
    pub mentioned: bool,
}

/// A button click on a previously sent card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonClick {
    pub id: Uuid,
    pub channel: String,
    pub sender_id: String,
    pub sender_name: Option<String>,
    /// Identifier of the clicked button (the action id).
    pub button_id: String,
    pub chat_id: String,
    pub timestamp: DateTime<Utc>,
}
