//! Stampede protection settings for read-through cache entries.

use super::SingleFlight;
use bazaar_config::CacheConfig;
use std::time::Duration;

/// Shared state and timing for [`CacheExt::remember`](super::CacheExt::remember).
#[derive(Debug)]
pub struct StampedeGuard {
    flights: SingleFlight,
    lock_ttl: Duration,
    lock_wait: Duration,
    poll_interval: Duration,
}

impl StampedeGuard {
    #[must_use]
    pub fn new(lock_ttl: Duration, lock_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            flights: SingleFlight::new(),
            lock_ttl,
            lock_wait,
            poll_interval,
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.lock_ttl(), config.lock_wait(), config.lock_poll_interval())
    }

    #[must_use]
    pub const fn flights(&self) -> &SingleFlight {
        &self.flights
    }

    /// Expiry of the cross-process lock, in case its holder dies.
    #[must_use]
    pub const fn lock_ttl(&self) -> Duration {
        self.lock_ttl
    }

    #[must_use]
    pub const fn lock_wait(&self) -> Duration {
        self.lock_wait
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for StampedeGuard {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheExt, CacheInterface, MemoryCacheService};
    use bazaar_core::{BazaarError, BazaarResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn guard() -> StampedeGuard {
        StampedeGuard::new(
            Duration::from_secs(10),
            Duration::from_millis(200),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn test_remember_computes_once_then_hits() {
        let cache = MemoryCacheService::new();
        let guard = guard();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: u32 = cache
                .remember("answer", Duration::from_secs(60), &guard, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remember_does_not_cache_errors() {
        let cache = MemoryCacheService::new();
        let guard = guard();

        let result: BazaarResult<u32> = cache
            .remember("broken", Duration::from_secs(60), &guard, || async {
                Err(BazaarError::internal("store down"))
            })
            .await;
        assert!(result.is_err());
        assert!(!cache.exists("broken").await.unwrap());
        assert!(!cache.exists("lock:broken").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_compute() {
        let cache = Arc::new(MemoryCacheService::new());
        let guard = Arc::new(guard());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let guard = Arc::clone(&guard);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .remember("tree", Duration::from_secs(60), &guard, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(vec![1_u8, 2, 3])
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_waits_for_foreign_lock_holder() {
        let cache = Arc::new(MemoryCacheService::new());
        let guard = guard();

        // Another process is recomputing.
        let token = cache
            .try_lock("lock:tree", Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();

        let filler = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                cache.set("tree", &7_u32, Duration::from_secs(60)).await.unwrap();
                cache.unlock("lock:tree", &token).await.unwrap();
            })
        };

        let value: u32 = cache
            .remember("tree", Duration::from_secs(60), &guard, || async {
                Ok(99)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        filler.await.unwrap();
    }

    #[tokio::test]
    async fn test_computes_after_lock_wait_expires() {
        let cache = MemoryCacheService::new();
        let guard = guard();
        cache
            .try_lock("lock:tree", Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();

        let value: u32 = cache
            .remember("tree", Duration::from_secs(60), &guard, || async { Ok(5) })
            .await
            .unwrap();

        assert_eq!(value, 5);
        assert_eq!(cache.get::<u32>("tree").await.unwrap(), Some(5));
    }
}
