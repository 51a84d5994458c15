//! Attaches generated images to card sections.
//!
//! Strictly additive: section text, order, count, and action rows are
//! never altered. Any provider failure skips that image and continues —
//! a partial or zero-image result is a valid, non-error outcome.

use muse_core::card::{Card, ImageRef};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::plan::{ImagePlan, MAX_IMAGES_PER_REQUEST};
use crate::provider::ImageProvider;

/// Generate and attach images for `plans`, capped at
/// [`MAX_IMAGES_PER_REQUEST`] provider calls. Returns how many images were
/// attached.
pub async fn augment(
    card: &mut Card,
    plans: &[ImagePlan],
    provider: &dyn ImageProvider,
    image_dir: &Path,
    size: &str,
) -> usize {
    if let Err(e) = std::fs::create_dir_all(image_dir) {
        warn!("images: failed to create {}: {e}", image_dir.display());
        return 0;
    }

    let mut attached = 0;
    for plan in plans.iter().take(MAX_IMAGES_PER_REQUEST) {
        let bytes = match provider.generate(&plan.prompt, size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("image generation failed, skipping: {e}");
                continue;
            }
        };

        let filename = format!("{}_{}.png", plan.filename_stem, Uuid::new_v4());
        let path = image_dir.join(&filename);
        if let Err(e) = std::fs::write(&path, &bytes) {
            warn!("failed to save image {filename}: {e}");
            continue;
        }

        if card.attach_image(plan.section_index, ImageRef { filename, path }) {
            attached += 1;
        } else {
            warn!(
                "image plan targeted section {} beyond card bounds",
                plan.section_index
            );
        }
    }

    if attached > 0 {
        info!("attached {attached} generated image(s)");
    }
    attached
}

/// Delete generated image files older than `max_age`. Returns the count
/// removed. Runs on a daily timer.
pub fn cleanup_stale_images(image_dir: &Path, max_age: Duration) -> usize {
    let entries = match std::fs::read_dir(image_dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let now = SystemTime::now();
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let stale = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|mtime| now.duration_since(mtime).ok())
            .is_some_and(|age| age > max_age);
        if stale {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("failed to remove stale image {}: {e}", path.display()),
            }
        }
    }

    if removed > 0 {
        info!("cleaned up {removed} old image file(s)");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use muse_core::card::Section;
    use muse_core::error::MuseError;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ImageProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate(&self, _prompt: &str, _size: &str) -> Result<Vec<u8>, MuseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(MuseError::Image("provider down".into()))
            } else {
                Ok(vec![0x89, 0x50, 0x4E, 0x47])
            }
        }
    }

    fn card_with_sections(n: usize) -> Card {
        let mut card = Card::new("test");
        for i in 0..n {
            card.sections
                .push(Section::new("#147EFB", format!("S{i}"), "body"));
        }
        card
    }

    fn plan(section_index: usize) -> ImagePlan {
        ImagePlan {
            section_index,
            prompt: "p".into(),
            filename_stem: format!("test_{section_index}"),
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("__muse_images_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_cap_limits_provider_calls() {
        let dir = temp_dir("cap");
        let provider = FakeProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let mut card = card_with_sections(12);
        let plans: Vec<_> = (0..10).map(plan).collect();

        let attached = augment(&mut card, &plans, &provider, &dir, "1024x1024").await;

        assert_eq!(attached, 3);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        let with_images = card.sections.iter().filter(|s| s.image.is_some()).count();
        assert_eq!(with_images, 3);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_card_untouched() {
        let dir = temp_dir("failure");
        let provider = FakeProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        };
        let mut card = card_with_sections(4);
        let before: Vec<(String, String)> = card
            .sections
            .iter()
            .map(|s| (s.title.clone(), s.body.clone()))
            .collect();

        let attached = augment(&mut card, &[plan(1), plan(2)], &provider, &dir, "1024x1024").await;

        assert_eq!(attached, 0);
        assert_eq!(card.sections.len(), 4);
        let after: Vec<(String, String)> = card
            .sections
            .iter()
            .map(|s| (s.title.clone(), s.body.clone()))
            .collect();
        assert_eq!(before, after);
        assert!(card.sections.iter().all(|s| s.image.is_none()));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_augment_is_strictly_additive() {
        let dir = temp_dir("additive");
        let provider = FakeProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        };
        let mut card = card_with_sections(3);
        card.action_rows.push(Vec::new());

        augment(&mut card, &[plan(1)], &provider, &dir, "1024x1024").await;

        assert_eq!(card.sections.len(), 3);
        assert_eq!(card.action_rows.len(), 1);
        assert_eq!(card.sections[1].title, "S1");
        assert!(card.sections[1].image.is_some());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_cleanup_removes_only_stale_files() {
        let dir = temp_dir("cleanup");
        std::fs::create_dir_all(&dir).unwrap();
        let fresh = dir.join("fresh.png");
        std::fs::write(&fresh, b"png").unwrap();

        // Nothing is older than a day yet.
        let removed = cleanup_stale_images(&dir, Duration::from_secs(24 * 60 * 60));
        assert_eq!(removed, 0);
        assert!(fresh.exists());

        // With a zero max age everything qualifies.
        let removed = cleanup_stale_images(&dir, Duration::from_secs(0));
        assert_eq!(removed, 1);
        assert!(!fresh.exists());

        let _ = std::fs::remove_dir_all(dir);
    }
}
