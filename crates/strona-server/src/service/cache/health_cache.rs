//! Store health with a short memory.
//!
//! `GET /health` is unauthenticated, so every poll would otherwise hit the
//! database. A result is reused until it is older than the configured window.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::service::AuthService;

const TRACING_TARGET_HEALTH: &str = "strona_server::service::health";

const DEFAULT_WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Probe {
    window: Duration,
    healthy: AtomicBool,
    /// Time of the last completed check. Held while a check runs, so
    /// concurrent callers wait for that result instead of pinging again.
    checked_at: Mutex<Option<Instant>>,
}

impl Probe {
    fn is_fresh(&self, checked_at: Option<Instant>) -> bool {
        checked_at.is_some_and(|at| at.elapsed() < self.window)
    }

    async fn status_or<F>(&self, check: F) -> bool
    where
        F: AsyncFnOnce() -> bool,
    {
        let mut checked_at = self.checked_at.lock().await;
        if self.is_fresh(*checked_at) {
            return self.healthy.load(Ordering::Acquire);
        }

        let healthy = check().await;
        self.healthy.store(healthy, Ordering::Release);
        *checked_at = Some(Instant::now());
        healthy
    }
}

/// Shared, time-bounded view of whether the credential store is reachable.
///
/// Clones observe the same state. Before the first check the store is
/// reported as unhealthy.
#[derive(Debug, Clone)]
pub struct HealthCache {
    probe: Arc<Probe>,
}

impl HealthCache {
    pub fn new() -> Self {
        Self::with_cache_duration(DEFAULT_WINDOW)
    }

    pub fn with_cache_duration(window: Duration) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_HEALTH,
            window_ms = window.as_millis() as u64,
            "health cache created"
        );

        Self {
            probe: Arc::new(Probe {
                window,
                healthy: AtomicBool::new(false),
                checked_at: Mutex::new(None),
            }),
        }
    }

    /// Pings the store through `auth_service` unless a recent answer exists.
    pub async fn is_healthy(&self, auth_service: &AuthService) -> bool {
        self.probe
            .status_or(async || ping(auth_service).await)
            .await
    }

    /// Last known answer, without checking.
    pub fn get_cached_health(&self) -> bool {
        self.probe.healthy.load(Ordering::Acquire)
    }

    /// Drops the remembered answer; the next [`is_healthy`] pings again.
    ///
    /// [`is_healthy`]: Self::is_healthy
    pub async fn invalidate(&self) {
        *self.probe.checked_at.lock().await = None;
    }
}

impl Default for HealthCache {
    fn default() -> Self {
        Self::new()
    }
}

#[tracing::instrument(skip_all, target = TRACING_TARGET_HEALTH)]
async fn ping(auth_service: &AuthService) -> bool {
    let started = Instant::now();
    let result = auth_service.ping_store().await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            tracing::debug!(target: TRACING_TARGET_HEALTH, elapsed_ms, "store reachable");
            true
        }
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET_HEALTH,
                elapsed_ms,
                error = %error,
                "store unreachable"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn probe(window: Duration) -> Probe {
        Probe {
            window,
            healthy: AtomicBool::new(false),
            checked_at: Mutex::new(None),
        }
    }

    #[tokio::test]
    async fn answer_is_reused_inside_the_window() {
        let probe = probe(Duration::from_secs(60));

        assert!(probe.status_or(async || true).await);
        assert!(probe.status_or(async || false).await);
    }

    #[tokio::test]
    async fn answer_expires_after_the_window() {
        let probe = probe(Duration::from_millis(10));

        assert!(probe.status_or(async || true).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!probe.status_or(async || false).await);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_check() {
        let probe = Arc::new(probe(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let probe = probe.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                probe
                    .status_or(async || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        true
                    })
                    .await
            })
        });

        for task in tasks.collect::<Vec<_>>() {
            assert!(task.await.expect("task should not panic"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_new_check() {
        let cache = HealthCache::with_cache_duration(Duration::from_secs(60));
        assert!(cache.probe.status_or(async || true).await);
        assert!(cache.get_cached_health());

        cache.invalidate().await;
        assert!(!cache.probe.status_or(async || false).await);
        assert!(!cache.get_cached_health());
    }

    #[test]
    fn unhealthy_until_checked() {
        assert!(!HealthCache::new().get_cached_health());
        assert!(!HealthCache::default().get_cached_health());
    }
}
