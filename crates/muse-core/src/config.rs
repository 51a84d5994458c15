use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MuseError;

/// Top-level Muse configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub muse: MuseConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub images: ImageConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuseConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for MuseConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    /// Group chats where the bot replies even when not mentioned.
    /// Direct messages and mentions are always answered.
    #[serde(default)]
    pub allowed_chats: Vec<i64>,
}

/// Session store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_file")]
    pub file: String,
    /// Profiles untouched for this many days are evicted.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
            retention_days: default_retention_days(),
        }
    }
}

/// Image generation config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_image_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_model")]
    pub model: String,
    #[serde(default = "default_image_size")]
    pub size: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            base_url: default_image_base_url(),
            model: default_image_model(),
            size: default_image_size(),
        }
    }
}

// --- Default value functions ---

fn default_name() -> String {
    "Muse".to_string()
}
fn default_data_dir() -> String {
    "~/.muse".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_session_file() -> String {
    "~/.muse/sessions.json".to_string()
}
fn default_retention_days() -> u64 {
    7
}
fn default_true() -> bool {
    true
}
fn default_image_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_image_model() -> String {
    "dall-e-3".to_string()
}
fn default_image_size() -> String {
    "1024x1024".to_string()
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. `TELEGRAM_BOT_TOKEN`
/// and `OPENAI_API_KEY` environment variables override empty config values.
pub fn load(path: &str) -> Result<Config, MuseError> {
    let path = Path::new(path);
    let mut config: Config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MuseError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| MuseError::Config(format!("failed to parse config: {e}")))?
    } else {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        Config {
            muse: MuseConfig::default(),
            channel: ChannelConfig {
                telegram: Some(TelegramConfig {
                    enabled: true,
                    bot_token: String::new(),
                    allowed_chats: Vec::new(),
                }),
            },
            session: SessionConfig::default(),
            images: ImageConfig::default(),
        }
    };

    if let Some(ref mut tg) = config.channel.telegram {
        if tg.bot_token.is_empty() {
            if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
                tg.bot_token = token;
            }
        }
    }
    if config.images.api_key.is_empty() {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.images.api_key = key;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.retention_days, 7);
        assert!(cfg.file.ends_with("sessions.json"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [muse]
            data_dir = "/tmp/muse"

            [channel.telegram]
            enabled = true
            bot_token = "123:abc"
            allowed_chats = [42]

            [images]
            enabled = false
        "#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.muse.data_dir, "/tmp/muse");
        let tg = cfg.channel.telegram.unwrap();
        assert!(tg.enabled);
        assert_eq!(tg.allowed_chats, vec![42]);
        assert!(!cfg.images.enabled);
        assert_eq!(cfg.images.model, "dall-e-3");
    }

    #[test]
    fn test_image_config_defaults_when_missing() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.images.enabled);
        assert_eq!(cfg.images.size, "1024x1024");
        assert_eq!(cfg.session.retention_days, 7);
    }

    #[test]
    fn test_shellexpand_passthrough() {
        assert_eq!(shellexpand("/var/lib/muse"), "/var/lib/muse");
    }
}
