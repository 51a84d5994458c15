mod gateway;

use clap::{Parser, Subcommand};
use muse_channels::telegram::TelegramChannel;
use muse_content::{templates, TemplateStore};
use muse_core::config;
use muse_images::{ImageProvider, OpenAiImages};
use muse_session::SessionStore;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "muse",
    version,
    about = "Muse — your creator success coach, over chat"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Muse bot.
    Start,
    /// Check configuration and session state.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            // Build channels. Transport misconfiguration is fatal at
            // startup; everything downstream degrades gracefully instead.
            let mut channels: HashMap<String, Arc<dyn muse_core::traits::Channel>> =
                HashMap::new();

            if let Some(ref tg) = cfg.channel.telegram {
                if tg.enabled {
                    if tg.bot_token.is_empty() {
                        anyhow::bail!(
                            "Telegram is enabled but bot_token is empty. \
                             Set it in config.toml or the TELEGRAM_BOT_TOKEN env var."
                        );
                    }
                    let channel = TelegramChannel::new(tg.clone());
                    channels.insert("telegram".to_string(), Arc::new(channel));
                }
            }

            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable at least one channel in config.toml.");
            }

            // Deploy bundled templates and open the stores.
            templates::install_bundled_templates(&cfg.muse.data_dir);
            let template_store = TemplateStore::new(&cfg.muse.data_dir);
            let sessions = SessionStore::load(&cfg.session.file);

            // Image augmentation is optional: disabled or key-less setups
            // run without it, no provider calls made.
            let images: Option<Arc<dyn ImageProvider>> = if cfg.images.enabled {
                let provider = OpenAiImages::from_config(
                    cfg.images.base_url.clone(),
                    cfg.images.api_key.clone(),
                    cfg.images.model.clone(),
                );
                if provider.is_configured() {
                    Some(Arc::new(provider))
                } else {
                    tracing::info!("image generation disabled: no API key");
                    None
                }
            } else {
                tracing::info!("image generation disabled by config");
                None
            };

            println!("✨ Muse — Starting creator coach...");
            let gw = Arc::new(gateway::Gateway::new(
                channels,
                sessions,
                template_store,
                images,
                &cfg,
            ));
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("✨ Muse — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Data dir: {}", cfg.muse.data_dir);
            println!();

            if let Some(ref tg) = cfg.channel.telegram {
                println!(
                    "  telegram: {}",
                    if tg.enabled && !tg.bot_token.is_empty() {
                        "configured"
                    } else if tg.enabled {
                        "enabled but missing bot_token"
                    } else {
                        "disabled"
                    }
                );
            } else {
                println!("  telegram: not configured");
            }

            println!(
                "  images: {}",
                if !cfg.images.enabled {
                    "disabled"
                } else if cfg.images.api_key.is_empty() {
                    "enabled but missing api_key"
                } else {
                    "configured"
                }
            );

            let sessions = SessionStore::load(&cfg.session.file);
            println!(
                "  sessions: {} profile(s) at {}",
                sessions.len().await,
                cfg.session.file
            );
        }
    }

    Ok(())
}
