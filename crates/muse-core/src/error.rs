use thiserror::Error;

/// Top-level error type for Muse.
#[derive(Debug, Error)]
pub enum MuseError {
    /// Error from a chat channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Session store error.
    #[error("session error: {0}")]
    Session(String),

    /// Template/content error.
    #[error("content error: {0}")]
    Content(String),

    /// Image provider error.
    #[error("image error: {0}")]
    Image(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
