//! Flat-file session store.
//!
//! The whole store is one serialized JSON document mapping user id to
//! profile. It is read once at startup and rewritten on flush. Persistence
//! failures are logged and non-fatal: the in-memory map stays authoritative
//! for the life of the process.
//!
//! Flush policy: write-through after every mutating call, plus a periodic
//! background flush driven by the gateway. Concurrent events for the same
//! user race with last-write-wins semantics; the `RwLock` only guarantees
//! the map itself is never structurally corrupted across handlers and
//! timers.

use chrono::{Duration, Utc};
use muse_core::{
    error::MuseError,
    intent::Intent,
    profile::{ProfileField, UserProfile},
    shellexpand,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Keyed mapping from user id to profile, persisted as one JSON file.
#[derive(Clone)]
pub struct SessionStore {
    path: PathBuf,
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl SessionStore {
    /// Load the store from `path`.
    ///
    /// A missing file starts an empty store; a corrupt file is logged and
    /// also starts empty. Startup never fails on persistence problems.
    pub fn load(path: &str) -> Self {
        let path = PathBuf::from(shellexpand(path));
        let profiles = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<HashMap<String, UserProfile>>(&data) {
                Ok(map) => {
                    info!("loaded {} session(s) from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!("failed to parse session file {}: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(_) => {
                info!("no session file at {}, starting empty", path.display());
                HashMap::new()
            }
        };

        Self {
            path,
            profiles: Arc::new(RwLock::new(profiles)),
        }
    }

    /// Number of stored profiles.
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    /// Return the existing profile or create one seeded with
    /// `default_handle`. Idempotent: an existing profile is never reset.
    pub async fn get_or_create(&self, user_id: &str, default_handle: &str) -> UserProfile {
        let mut created = false;
        let profile = {
            let mut map = self.profiles.write().await;
            map.entry(user_id.to_string())
                .or_insert_with(|| {
                    created = true;
                    UserProfile::new(user_id, default_handle)
                })
                .clone()
        };
        if created {
            self.flush_logged().await;
        }
        profile
    }

    /// Look up a profile without creating one.
    pub async fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.read().await.get(user_id).cloned()
    }

    /// Set a single field, creating the profile if absent so the write is
    /// never lost.
    pub async fn update(
        &self,
        user_id: &str,
        default_handle: &str,
        field: ProfileField,
        value: &str,
    ) {
        {
            let mut map = self.profiles.write().await;
            let profile = map
                .entry(user_id.to_string())
                .or_insert_with(|| UserProfile::new(user_id, default_handle));
            match field {
                ProfileField::PrimaryHandle => profile.primary_handle = value.to_string(),
                ProfileField::SecondaryHandle => profile.secondary_handle = Some(value.to_string()),
                ProfileField::Brief => profile.brief = value.to_string(),
            }
        }
        self.flush_logged().await;
    }

    /// Update `last_interaction` to now. Called on every inbound event.
    pub async fn touch(&self, user_id: &str) {
        {
            let mut map = self.profiles.write().await;
            if let Some(profile) = map.get_mut(user_id) {
                profile.last_interaction = Utc::now();
            }
        }
        self.flush_logged().await;
    }

    /// Record the last classified intent for a user.
    pub async fn set_last_intent(&self, user_id: &str, intent: Intent) {
        {
            let mut map = self.profiles.write().await;
            if let Some(profile) = map.get_mut(user_id) {
                profile.last_intent = Some(intent);
            }
        }
        self.flush_logged().await;
    }

    /// Persist the entire store to disk.
    pub async fn flush(&self) -> Result<(), MuseError> {
        let data = {
            let map = self.profiles.read().await;
            serde_json::to_string_pretty(&*map)?
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    /// Remove profiles whose last interaction is older than `window`.
    /// Returns the number evicted.
    pub async fn evict_stale(&self, window: Duration) -> usize {
        let cutoff = Utc::now() - window;
        let evicted = {
            let mut map = self.profiles.write().await;
            let before = map.len();
            map.retain(|_, profile| profile.last_interaction >= cutoff);
            before - map.len()
        };
        if evicted > 0 {
            info!("evicted {evicted} stale session(s)");
            self.flush_logged().await;
        }
        evicted
    }

    /// Write-through flush: errors are logged, never propagated.
    async fn flush_logged(&self) {
        if let Err(e) = self.flush().await {
            warn!("session flush failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (SessionStore, PathBuf) {
        let path = std::env::temp_dir().join(format!("__muse_session_{name}.json"));
        let _ = std::fs::remove_file(&path);
        (SessionStore::load(path.to_str().unwrap()), path)
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let (store, path) = temp_store("idempotent");

        let first = store.get_or_create("u1", "Alice").await;
        assert_eq!(first.primary_handle, "Alice");
        assert!(first.brief.is_empty());

        store.update("u1", "Alice", ProfileField::Brief, "Product: Lumo").await;
        store.set_last_intent("u1", Intent::Hook).await;

        // A second call never resets brief or last_intent.
        let second = store.get_or_create("u1", "SomeoneElse").await;
        assert_eq!(second.primary_handle, "Alice");
        assert_eq!(second.brief, "Product: Lumo");
        assert_eq!(second.last_intent, Some(Intent::Hook));
        assert_eq!(store.len().await, 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_update_creates_if_absent() {
        let (store, path) = temp_store("create_absent");

        store.update("u2", "Bea", ProfileField::SecondaryHandle, "@bea.ig").await;
        let profile = store.get("u2").await.unwrap();
        assert_eq!(profile.primary_handle, "Bea");
        assert_eq!(profile.secondary_handle.as_deref(), Some("@bea.ig"));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_eviction_window() {
        let (store, path) = temp_store("eviction");

        store.get_or_create("old", "Old").await;
        store.get_or_create("fresh", "Fresh").await;
        {
            let mut map = store.profiles.write().await;
            map.get_mut("old").unwrap().last_interaction = Utc::now() - Duration::days(8);
            map.get_mut("fresh").unwrap().last_interaction = Utc::now() - Duration::days(6);
        }

        let evicted = store.evict_stale(Duration::days(7)).await;
        assert_eq!(evicted, 1);
        assert!(store.get("old").await.is_none());
        assert!(store.get("fresh").await.is_some());

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_flush_and_reload_round_trip() {
        let (store, path) = temp_store("roundtrip");

        store.get_or_create("u3", "Cleo").await;
        store.update("u3", "Cleo", ProfileField::Brief, "Product: GlowPatch").await;
        store.flush().await.unwrap();

        let reloaded = SessionStore::load(path.to_str().unwrap());
        let profile = reloaded.get("u3").await.unwrap();
        assert_eq!(profile.primary_handle, "Cleo");
        assert_eq!(profile.brief, "Product: GlowPatch");

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let path = std::env::temp_dir().join("__muse_session_corrupt.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::load(path.to_str().unwrap());
        assert_eq!(store.len().await, 0);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_touch_updates_last_interaction() {
        let (store, path) = temp_store("touch");

        store.get_or_create("u4", "Dee").await;
        {
            let mut map = store.profiles.write().await;
            map.get_mut("u4").unwrap().last_interaction = Utc::now() - Duration::days(3);
        }
        store.touch("u4").await;
        let profile = store.get("u4").await.unwrap();
        assert!(Utc::now() - profile.last_interaction < Duration::minutes(1));

        let _ = std::fs::remove_file(path);
    }
}
