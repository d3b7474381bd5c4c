//! TTL Cleanup Task
//!
//! Background sweep that periodically removes expired cache entries so that
//! values nobody reads again do not accumulate.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::SharedCache;

/// Default spacing between sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodic sweep over a shared cache with explicit lifecycle.
///
/// Nothing runs until [`start`](Self::start) is called. The first sweep
/// happens one full interval after starting. Dropping the task stops it.
///
/// # Example
/// ```ignore
/// let cache = CacheStore::shared();
/// let mut sweeper = CleanupTask::new(cache.clone(), Duration::from_secs(300));
/// sweeper.start();
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
pub struct CleanupTask<V> {
    cache: SharedCache<V>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl<V> CleanupTask<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// A zero `interval` falls back to [`DEFAULT_CLEANUP_INTERVAL`].
    pub fn new(cache: SharedCache<V>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                "Zero cleanup interval, using default of {} seconds",
                DEFAULT_CLEANUP_INTERVAL.as_secs()
            );
            DEFAULT_CLEANUP_INTERVAL
        } else {
            interval
        };

        Self {
            cache,
            interval,
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the sweep loop. Calling it while already running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("TTL cleanup task already running");
            return;
        }

        let cache = self.cache.clone();
        let period = self.interval;
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            period.as_secs()
        );

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                // Hold the write lock only for the scan itself
                let (removed, remaining) = {
                    let mut cache_guard = cache.write().await;
                    let removed = cache_guard.cleanup();
                    (removed, cache_guard.len())
                };

                if removed > 0 {
                    info!(
                        "TTL cleanup: removed {} expired entries, {} remaining",
                        removed, remaining
                    );
                } else {
                    debug!("TTL cleanup: no expired entries found");
                }
            }
        }));
    }

    /// Aborts the sweep loop if it is running.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("TTL cleanup task stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<V> Drop for CleanupTask<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
