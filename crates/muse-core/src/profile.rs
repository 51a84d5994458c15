use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Per-user persisted state: handles, brief, last intent, last-seen time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    /// TikTok handle; seeded from the transport-provided username.
    pub primary_handle: String,
    /// Instagram handle.
    #[serde(default)]
    pub secondary_handle: Option<String>,
    /// Free-text product/content description.
    #[serde(default)]
    pub brief: String,
    #[serde(default)]
    pub last_intent: Option<Intent>,
    pub last_interaction: DateTime<Utc>,
}

impl UserProfile {
    /// Fresh profile seeded with the transport-provided display name.
    pub fn new(id: impl Into<String>, default_handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary_handle: default_handle.into(),
            secondary_handle: None,
            brief: String::new(),
            last_intent: None,
            last_interaction: Utc::now(),
        }
    }
}

/// Updatable profile fields, as referenced by "update my ..." messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    /// TikTok handle.
    PrimaryHandle,
    /// Instagram handle.
    SecondaryHandle,
    /// Product brief.
    Brief,
}

impl ProfileField {
    /// User-facing name, used in confirmation replies.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PrimaryHandle => "TikTok handle",
            Self::SecondaryHandle => "Instagram handle",
            Self::Brief => "product brief",
        }
    }
}
