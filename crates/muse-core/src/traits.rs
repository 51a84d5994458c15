use crate::{card::Card, error::MuseError, event::InboundEvent};
use async_trait::async_trait;

/// Chat transport trait.
///
/// Every messaging platform implements this to deliver inbound events and
/// render outbound cards. The gateway never sees platform specifics.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for inbound events.
    /// Returns a receiver that yields messages and button clicks.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundEvent>, MuseError>;

    /// Render and send a card to the given target (e.g. chat id).
    async fn send_card(&self, target: &str, card: &Card) -> Result<(), MuseError>;

    /// Send a plain text reply.
    async fn send_text(&self, target: &str, text: &str) -> Result<(), MuseError>;

    /// Send a typing indicator while a response is being prepared.
    async fn send_typing(&self, _target: &str) -> Result<(), MuseError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), MuseError>;
}
