// Per-run memoizing decorator for any NeighborSource.
//
// Keyed by (term, limit). Concurrent lookups of the same key share one
// in-flight request (tokio OnceCell per key). Failures are not stored: the
// key's empty cell is evicted, so the next caller tries again and a run that
// skips many failing terms does not accumulate dead entries. The cache lives only as long as the value; it is
// never written to disk because the service's answers drift between runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::traits::{NeighborSet, NeighborSource};
use crate::error::SimilarityError;

type CacheKey = (String, u32);

/// Read-through, single-flight cache in front of another source.
pub struct CachedSource<S> {
    inner: S,
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<NeighborSet>>>>,
}

impl<S: NeighborSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of keys that have a resolved neighbor set.
    pub fn len(&self) -> usize {
        self.lock_entries()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything, e.g. between two aggregation runs.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<OnceCell<NeighborSet>>>> {
        // The map is only touched in short non-panicking sections.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<S: NeighborSource> NeighborSource for CachedSource<S> {
    async fn fetch_neighbors(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<NeighborSet, SimilarityError> {
        let key = (term.to_string(), limit);
        let cell = {
            let mut entries = self.lock_entries();
            entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        match cell
            .get_or_try_init(|| self.inner.fetch_neighbors(term, limit))
            .await
        {
            Ok(neighbors) => Ok(neighbors.clone()),
            Err(e) => {
                let mut entries = self.lock_entries();
                // Another caller may have replaced or filled the cell meanwhile.
                let stale = entries
                    .get(&key)
                    .is_some_and(|current| Arc::ptr_eq(current, &cell) && !current.initialized());
                if stale {
                    entries.remove(&key);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupCause;
    use crate::neighbors::fixture::FixtureSource;
    use std::time::Duration;

    #[tokio::test]
    async fn test_repeated_lookup_hits_inner_once() {
        let cached = CachedSource::new(FixtureSource::new().with_term("cat", &["feline", "pet"]));
        let first = cached.fetch_neighbors("cat", 100).await.unwrap();
        let second = cached.fetch_neighbors("cat", 100).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner().call_count(), 1);
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn test_limit_is_part_of_key() {
        let cached = CachedSource::new(FixtureSource::new().with_term("cat", &["feline", "pet"]));
        let short = cached.fetch_neighbors("cat", 1).await.unwrap();
        let long = cached.fetch_neighbors("cat", 100).await.unwrap();
        assert_eq!(short.len(), 1);
        assert_eq!(long.len(), 2);
        assert_eq!(cached.inner().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_lookups_share_one_request() {
        // The inner lookup sleeps, so all eight callers arrive while it is pending.
        let cached = CachedSource::new(
            FixtureSource::new()
                .with_term("cat", &["feline"])
                .with_delay(Duration::from_millis(50)),
        );
        let results = futures::future::join_all((0..8).map(|_| cached.fetch_neighbors("cat", 10))).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(cached.inner().call_count(), 1);
        assert_eq!(cached.inner().peak_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_lookups_share_one_request() {
        let cached = Arc::new(CachedSource::new(
            FixtureSource::new()
                .with_term("cat", &["feline", "pet"])
                .with_delay(Duration::from_millis(50)),
        ));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cached = Arc::clone(&cached);
                tokio::spawn(async move { cached.fetch_neighbors("cat", 10).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().len(), 2);
        }
        assert_eq!(cached.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cached = CachedSource::new(FixtureSource::new().with_failure("dog", LookupCause::Timeout));
        assert!(cached.fetch_neighbors("dog", 10).await.is_err());
        assert!(cached.fetch_neighbors("dog", 10).await.is_err());
        assert_eq!(cached.inner().call_count(), 2);
        assert!(cached.is_empty());
    }

    #[tokio::test]
    async fn test_failed_keys_are_evicted() {
        let cached = CachedSource::new(
            FixtureSource::new()
                .with_term("cat", &["feline"])
                .with_failure("dog", LookupCause::Status(503))
                .with_failure("fox", LookupCause::Timeout),
        );
        cached.fetch_neighbors("cat", 10).await.unwrap();
        assert!(cached.fetch_neighbors("dog", 10).await.is_err());
        assert!(cached.fetch_neighbors("fox", 10).await.is_err());

        let entries = cached.lock_entries();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&("cat".to_string(), 10)));
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cached = CachedSource::new(FixtureSource::new().with_term("cat", &["feline"]));
        cached.fetch_neighbors("cat", 10).await.unwrap();
        cached.clear();
        cached.fetch_neighbors("cat", 10).await.unwrap();
        assert_eq!(cached.inner().call_count(), 2);
    }
}
