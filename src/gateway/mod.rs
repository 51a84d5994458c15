//! Gateway — the event loop connecting channels, sessions, and content.
//!
//! Inbound events fan into one queue and are handled concurrently; the
//! session store's own lock covers the shared map. Background timers
//! (session flush, stale-session eviction, stale-image cleanup) run
//! independently of request handling.

mod buttons;
mod jobs;
mod router;

use muse_content::TemplateStore;
use muse_core::{config::Config, event::InboundEvent, shellexpand, traits::Channel};
use muse_images::ImageProvider;
use muse_session::SessionStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub use jobs::RegenJobs;

/// Periodic best-effort flush of the session store.
const FLUSH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Daily timers: stale-session eviction and generated-image cleanup.
const DAILY: Duration = Duration::from_secs(24 * 60 * 60);

/// Generated images older than this are deleted by the daily sweep.
const IMAGE_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// The central gateway that routes events between channels and content.
pub struct Gateway {
    pub(crate) channels: HashMap<String, Arc<dyn Channel>>,
    pub(crate) sessions: SessionStore,
    pub(crate) templates: TemplateStore,
    /// Image augmentation backend; `None` disables augmentation entirely.
    pub(crate) images: Option<Arc<dyn ImageProvider>>,
    pub(crate) image_dir: PathBuf,
    pub(crate) image_size: String,
    pub(crate) allowed_chats: Vec<i64>,
    pub(crate) retention_days: u64,
    pub(crate) jobs: RegenJobs,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        channels: HashMap<String, Arc<dyn Channel>>,
        sessions: SessionStore,
        templates: TemplateStore,
        images: Option<Arc<dyn ImageProvider>>,
        config: &Config,
    ) -> Self {
        let allowed_chats = config
            .channel
            .telegram
            .as_ref()
            .map(|tg| tg.allowed_chats.clone())
            .unwrap_or_default();
        let image_dir = PathBuf::from(shellexpand(&config.muse.data_dir)).join("generated_images");

        Self {
            channels,
            sessions,
            templates,
            images,
            image_dir,
            image_size: config.images.size.clone(),
            allowed_chats,
            retention_days: config.session.retention_days,
            jobs: RegenJobs::new(),
        }
    }

    /// Run the main event loop until a shutdown signal arrives.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Muse gateway running | channels: {} | images: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            if self.images.is_some() { "enabled" } else { "disabled" },
        );

        let (tx, mut rx) = mpsc::channel::<InboundEvent>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(event) = channel_rx.recv().await {
                    if tx.send(event).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Periodic session flush.
        let flush_sessions = self.sessions.clone();
        let flush_handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(FLUSH_INTERVAL).await;
                if let Err(e) = flush_sessions.flush().await {
                    warn!("periodic session flush failed: {e}");
                }
            }
        });

        // Daily stale-session eviction.
        let evict_sessions = self.sessions.clone();
        let retention = chrono::Duration::days(self.retention_days as i64);
        let evict_handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(DAILY).await;
                evict_sessions.evict_stale(retention).await;
            }
        });

        // Daily stale-image cleanup.
        let cleanup_dir = self.image_dir.clone();
        let cleanup_handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(DAILY).await;
                muse_images::cleanup_stale_images(&cleanup_dir, IMAGE_MAX_AGE);
            }
        });

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_event(event).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // Graceful shutdown: stop timers and jobs, flush, stop channels.
        flush_handle.abort();
        evict_handle.abort();
        cleanup_handle.abort();
        self.jobs.abort_all().await;

        if let Err(e) = self.sessions.flush().await {
            warn!("final session flush failed: {e}");
        }
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        info!("Shutdown complete.");
        Ok(())
    }

    /// Dispatch one inbound event.
    pub(crate) async fn handle_event(self: Arc<Self>, event: InboundEvent) {
        match event {
            InboundEvent::Message(msg) => self.handle_message(msg).await,
            InboundEvent::Button(click) => self.handle_click(click).await,
        }
    }
}
