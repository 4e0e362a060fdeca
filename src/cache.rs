//! Process-wide TTL cache with dependency-tag invalidation.
//!
//! Shared, read-mostly state (the catalog index, the default-language
//! tables) lives behind [`TtlCache`]. A cached value stays valid until its
//! TTL elapses or one of the [`InvalidationTag`]s it was computed under is
//! bumped, whichever comes first. Replacement is atomic: readers either see
//! the previous complete value or the new complete value, never a partial
//! build.
//!
//! Concurrent misses are allowed to recompute redundantly; there is no
//! single-flight guard. Last writer wins on the replacement, which is safe
//! because entries are immutable snapshots.

use anyhow::Result;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// A change-notification handle a data source hands to its consumers.
///
/// Bumping the tag marks every cache entry computed under it as stale, so
/// the next access recomputes even before TTL expiry.
#[derive(Debug, Clone, Default)]
pub struct InvalidationTag(Arc<AtomicU64>);

impl InvalidationTag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark everything depending on this tag as stale.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn version(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

struct Entry<T> {
    value: Arc<T>,
    refreshed_at: Instant,
    deps: Vec<(InvalidationTag, u64)>,
}

impl<T> Entry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.refreshed_at.elapsed() < ttl
            && self
                .deps
                .iter()
                .all(|(tag, version)| tag.version() == *version)
    }
}

/// Single-slot cache: one value, one TTL, a recorded set of dependency tags.
pub struct TtlCache<T> {
    name: &'static str,
    ttl: Duration,
    slot: RwLock<Option<Entry<T>>>,
}

impl<T> TtlCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached value, or run `compute` and cache its output.
    ///
    /// Dependency versions are captured before `compute` runs, so a tag
    /// bumped mid-computation still forces a recompute on the next access.
    pub async fn load_or_compute<F, Fut>(
        &self,
        deps: &[InvalidationTag],
        compute: F,
    ) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        {
            let slot = self.slot.read().await;
            if let Some(entry) = slot.as_ref() {
                if entry.is_fresh(self.ttl) {
                    return Ok(Arc::clone(&entry.value));
                }
            }
        }

        let recorded: Vec<(InvalidationTag, u64)> = deps
            .iter()
            .map(|tag| (tag.clone(), tag.version()))
            .collect();
        let refreshed_at = Instant::now();

        let value = Arc::new(compute().await?);
        debug!("cache '{}' recomputed", self.name);

        let mut slot = self.slot.write().await;
        *slot = Some(Entry {
            value: Arc::clone(&value),
            refreshed_at,
            deps: recorded,
        });

        Ok(value)
    }

    /// Drop the cached value outright.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn test_computes_once_while_fresh() {
        let cache: TtlCache<u32> = TtlCache::new("test", Duration::from_secs(60));
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value = cache
                .load_or_compute(&[], || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(*value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_recomputes() {
        let cache: TtlCache<u32> = TtlCache::new("test", Duration::ZERO);
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            cache
                .load_or_compute(&[], || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_tag_bump_forces_recompute_before_ttl() {
        let cache: TtlCache<u32> = TtlCache::new("test", Duration::from_secs(3600));
        let tag = InvalidationTag::new();
        let calls = AtomicU32::new(0);

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        };

        cache.load_or_compute(&[tag.clone()], compute).await.unwrap();
        cache.load_or_compute(&[tag.clone()], compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tag.invalidate();
        cache.load_or_compute(&[tag.clone()], compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unrelated_tag_does_not_invalidate() {
        let cache: TtlCache<u32> = TtlCache::new("test", Duration::from_secs(3600));
        let dep = InvalidationTag::new();
        let other = InvalidationTag::new();
        let calls = AtomicU32::new(0);

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        };

        cache.load_or_compute(&[dep.clone()], compute).await.unwrap();
        other.invalidate();
        cache.load_or_compute(&[dep.clone()], compute).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_invalidate_clears_slot() {
        let cache: TtlCache<u32> = TtlCache::new("test", Duration::from_secs(3600));
        let calls = AtomicU32::new(0);

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        };

        cache.load_or_compute(&[], compute).await.unwrap();
        cache.invalidate().await;
        cache.load_or_compute(&[], compute).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_compute_error_leaves_slot_empty() {
        let cache: TtlCache<u32> = TtlCache::new("test", Duration::from_secs(3600));

        let failed = cache
            .load_or_compute(&[], || async { anyhow::bail!("catalog down") })
            .await;
        assert!(failed.is_err());

        let value = cache.load_or_compute(&[], || async { Ok(9) }).await.unwrap();
        assert_eq!(*value, 9);
    }

    #[tokio::test]
    async fn test_tag_bump_during_compute_is_not_lost() {
        let cache: TtlCache<u32> = TtlCache::new("test", Duration::from_secs(3600));
        let tag = InvalidationTag::new();
        let calls = AtomicU32::new(0);

        // The bump lands while the first compute is in flight; the recorded
        // version predates it, so the next access must recompute.
        cache
            .load_or_compute(&[tag.clone()], || async {
                calls.fetch_add(1, Ordering::SeqCst);
                tag.invalidate();
                Ok(0)
            })
            .await
            .unwrap();

        cache
            .load_or_compute(&[tag.clone()], || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(0)
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
