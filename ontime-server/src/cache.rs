//! Caching layer for arrival snapshots.
//!
//! Capturing a snapshot costs one ETA query per boarding on the route. A
//! snapshot is only as good as the minute it was taken in, so requests that
//! land in the same time bucket share one capture and the TTL keeps a stale
//! bucket from outliving its data.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{ClockTime, Route};
use crate::eta::EtaProvider;
use crate::oracle::{MaxWaitByRoute, WaitSnapshot};

/// Cache key for snapshots: (date, time bucket).
/// Time bucket is minutes from midnight divided by the bucket size.
type SnapshotKey = (NaiveDate, u16);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Time bucket size in minutes.
    pub bucket_mins: u16,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(20),
            max_capacity: 64,
            bucket_mins: 1,
        }
    }
}

/// Cache of captured wait snapshots.
#[derive(Clone)]
pub struct SnapshotCache {
    snapshots: MokaCache<SnapshotKey, Arc<WaitSnapshot>>,

    /// Time bucket size in minutes.
    bucket_mins: u16,
}

impl SnapshotCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let snapshots = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            snapshots,
            bucket_mins: config.bucket_mins.max(1),
        }
    }

    /// Compute the cache key for an instant.
    fn key(&self, now: NaiveDateTime) -> SnapshotKey {
        let mins = ClockTime::of_day(&now).minutes();
        (now.date(), mins / self.bucket_mins)
    }

    /// Snapshot for `now`'s bucket, capturing one from `provider` if needed.
    ///
    /// Capture targets are the boardings of `route`. Concurrent callers in
    /// the same bucket share a single capture.
    pub async fn get_or_capture<P: EtaProvider>(
        &self,
        now: NaiveDateTime,
        provider: &P,
        route: &Route,
        max_wait: &MaxWaitByRoute,
    ) -> Arc<WaitSnapshot> {
        let key = self.key(now);
        let captured = AtomicBool::new(false);

        let snapshot = self
            .snapshots
            .get_with(key, async {
                captured.store(true, Ordering::Relaxed);
                Arc::new(
                    WaitSnapshot::capture(now, provider, route.boardings(), max_wait.clone())
                        .await,
                )
            })
            .await;

        if captured.load(Ordering::Relaxed) {
            debug!(
                bucket = key.1,
                captured = snapshot.len(),
                provider = provider.name(),
                cached = self.entry_count(),
                "captured snapshot"
            );
        } else {
            debug!(bucket = key.1, "snapshot cache hit");
        }
        snapshot
    }

    /// Number of cached snapshots.
    pub fn entry_count(&self) -> u64 {
        self.snapshots.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.snapshots.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Segment;
    use crate::eta::EtaError;
    use std::sync::atomic::AtomicUsize;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl EtaProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn eta_minutes(&self, _stop: &str, _route: &str) -> Result<Option<u32>, EtaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Let concurrent callers interleave with the capture
            tokio::task::yield_now().await;
            Ok(Some(4))
        }
    }

    fn route() -> Route {
        Route::new(vec![
            Segment::walk(5),
            Segment::board("미금역", "수인분당선"),
            Segment::walk(10),
            Segment::board("203000075", "5100"),
        ])
    }

    #[test]
    fn key_calculation() {
        let cache = SnapshotCache::new(&CacheConfig {
            bucket_mins: 5,
            ..CacheConfig::default()
        });

        // 10:00 = 600 mins, bucket size 5 → bucket 120
        assert_eq!(cache.key(at(10, 0, 0)).1, 120);

        // 10:04:59 → still bucket 120
        assert_eq!(cache.key(at(10, 4, 59)).1, 120);

        // 10:05 → bucket 121
        assert_eq!(cache.key(at(10, 5, 0)).1, 121);
    }

    #[test]
    fn zero_bucket_size_treated_as_one() {
        let cache = SnapshotCache::new(&CacheConfig {
            bucket_mins: 0,
            ..CacheConfig::default()
        });
        assert_eq!(cache.key(at(10, 0, 0)).1, 600);
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(20));
        assert_eq!(config.max_capacity, 64);
        assert_eq!(config.bucket_mins, 1);
    }

    #[tokio::test]
    async fn same_minute_shares_capture() {
        let cache = SnapshotCache::new(&CacheConfig::default());
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let max_wait = MaxWaitByRoute::new();

        let first = cache
            .get_or_capture(at(8, 0, 5), &provider, &route(), &max_wait)
            .await;
        let second = cache
            .get_or_capture(at(8, 0, 50), &provider, &route(), &max_wait)
            .await;

        // One query per boarding, once
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.arrivals("미금", "수인분당선"), &[4]);
    }

    #[tokio::test]
    async fn concurrent_requests_share_capture() {
        let cache = SnapshotCache::new(&CacheConfig::default());
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let max_wait = MaxWaitByRoute::new();
        let route = route();

        let (first, second) = tokio::join!(
            cache.get_or_capture(at(8, 0, 5), &provider, &route, &max_wait),
            cache.get_or_capture(at(8, 0, 30), &provider, &route, &max_wait),
        );

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn next_minute_captures_again() {
        let cache = SnapshotCache::new(&CacheConfig::default());
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let max_wait = MaxWaitByRoute::new();

        cache
            .get_or_capture(at(8, 0, 5), &provider, &route(), &max_wait)
            .await;
        let later = cache
            .get_or_capture(at(8, 1, 0), &provider, &route(), &max_wait)
            .await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(later.now(), at(8, 1, 0));
    }

    #[tokio::test]
    async fn invalidate_forces_capture() {
        let cache = SnapshotCache::new(&CacheConfig::default());
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let max_wait = MaxWaitByRoute::new();

        cache
            .get_or_capture(at(8, 0, 0), &provider, &route(), &max_wait)
            .await;
        cache.invalidate_all();
        cache
            .get_or_capture(at(8, 0, 0), &provider, &route(), &max_wait)
            .await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }
}
