//! Tracked, cancellable regeneration jobs.
//!
//! Button-driven "regenerate" work runs on a short delay. Instead of bare
//! fire-and-forget callbacks, jobs are registered per user key so they are
//! observable, a newer job replaces an in-flight one, and everything can
//! be aborted on shutdown.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Registry of pending regeneration jobs, keyed by `channel:sender_id`.
#[derive(Clone, Default)]
pub struct RegenJobs {
    inner: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl RegenJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `work` to run after `delay`, replacing (and aborting) any
    /// job already pending under the same key.
    pub async fn schedule<F>(&self, key: String, delay: Duration, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let inner = self.inner.clone();
        let cleanup_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
            inner.lock().await.remove(&cleanup_key);
        });

        if let Some(previous) = self.inner.lock().await.insert(key, handle) {
            previous.abort();
        }
    }

    /// Cancel the pending job for a key, if any.
    pub async fn cancel(&self, key: &str) -> bool {
        match self.inner.lock().await.remove(key) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of pending jobs.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Abort every pending job. Used on shutdown.
    pub async fn abort_all(&self) {
        let mut map = self.inner.lock().await;
        for (_, handle) in map.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_job_runs_after_delay() {
        let jobs = RegenJobs::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        jobs.schedule("telegram:u1".into(), Duration::from_millis(10), async move {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .await;
        assert_eq!(jobs.len().await, 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(jobs.len().await, 0);
    }

    #[tokio::test]
    async fn test_newer_job_replaces_pending_one() {
        let jobs = RegenJobs::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c1 = counter.clone();
        jobs.schedule("telegram:u1".into(), Duration::from_secs(60), async move {
            c1.fetch_add(100, Ordering::SeqCst);
        })
        .await;

        let c2 = counter.clone();
        jobs.schedule("telegram:u1".into(), Duration::from_millis(10), async move {
            c2.fetch_add(1, Ordering::SeqCst);
        })
        .await;
        assert_eq!(jobs.len().await, 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        // Only the replacement ran; the first was aborted mid-sleep.
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_pending_job() {
        let jobs = RegenJobs::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();

        jobs.schedule("telegram:u2".into(), Duration::from_secs(60), async move {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert!(jobs.cancel("telegram:u2").await);
        assert!(!jobs.cancel("telegram:u2").await);
        assert_eq!(jobs.len().await, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_abort_all() {
        let jobs = RegenJobs::new();
        for i in 0..3 {
            jobs.schedule(format!("telegram:u{i}"), Duration::from_secs(60), async {})
                .await;
        }
        assert_eq!(jobs.len().await, 3);
        jobs.abort_all().await;
        assert_eq!(jobs.len().await, 0);
    }
}
