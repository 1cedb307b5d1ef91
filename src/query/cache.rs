//! Keyed result cache with staleness windows
//!
//! This module provides the in-process store behind every read:
//! - Serving fresh entries without touching the network
//! - Refetching stale or invalidated entries
//! - One optional retry for retryable failures
//! - Prefix invalidation after mutations
//! - Full teardown on logout
//!
//! Invalidation and teardown bump a generation counter. A fetch that was
//! already in flight still returns its value but does not store it, so a
//! late response cannot mask an invalidation or survive a logout.

use crate::api::ApiError;
use crate::query::key::QueryKey;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How long a result stays fresh and whether a failure is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Age after which a cached result is refetched; zero means always
    pub stale_time: Duration,
    /// Extra attempts after a retryable failure (0 or 1)
    pub retry: u32,
}

impl QueryPolicy {
    /// Fresh for `stale_time`, one retry
    pub const fn fresh_for(stale_time: Duration) -> Self {
        Self {
            stale_time,
            retry: 1,
        }
    }

    /// Always refetched, never retried
    pub const fn always() -> Self {
        Self {
            stale_time: Duration::ZERO,
            retry: 0,
        }
    }

    pub const fn minutes(minutes: u64) -> Self {
        Self::fresh_for(Duration::from_secs(minutes * 60))
    }

    pub const fn without_retry(self) -> Self {
        Self { retry: 0, ..self }
    }
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    invalidated: bool,
}

impl Entry {
    fn new(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            invalidated: false,
        }
    }

    fn is_fresh(&self, policy: &QueryPolicy) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < policy.stale_time
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<QueryKey, Entry>,
    generation: u64,
}

/// Process-wide query cache
pub struct QueryCache {
    entries: Mutex<Entries>,
    retry_delay: Duration,
}

impl QueryCache {
    /// Creates an empty cache
    ///
    /// # Arguments
    ///
    /// * `retry_delay` - Pause before the retry of a failed read
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            retry_delay,
        }
    }

    /// Returns the cached value for `key`, refetching when it is not fresh
    ///
    /// # Arguments
    ///
    /// * `key` - Identity of the read
    /// * `policy` - Staleness window and retry allowance
    /// * `fetcher` - Issues the underlying service call
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<T>)` - Cached or freshly fetched value; a value fetched
    ///   across an invalidation is returned but not cached
    /// * `Err(ApiError)` - The last fetch attempt failed; the cache is untouched
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        policy: &QueryPolicy,
        fetcher: F,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(value) = self.fresh::<T>(key, policy) {
            tracing::trace!("cache hit {}", key);
            return Ok(value);
        }

        let generation = self.lock().generation;
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => {
                    let value = Arc::new(value);
                    self.store_if_current(key.clone(), value.clone(), generation);
                    return Ok(value);
                }
                Err(e) if attempt < policy.retry && e.is_retryable() => {
                    attempt += 1;
                    tracing::debug!("Retrying {} after error: {}", key, e);
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Cached value regardless of freshness
    pub fn get<T>(&self, key: &QueryKey) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.lock()
            .map
            .get(key)
            .and_then(|entry| entry.value.clone().downcast::<T>().ok())
    }

    /// Stores `value` as freshly fetched
    pub fn set<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.store(key, Arc::new(value));
    }

    /// Whether `key` would be served from cache under `policy`
    pub fn is_fresh(&self, key: &QueryKey, policy: &QueryPolicy) -> bool {
        self.lock()
            .map
            .get(key)
            .map(|entry| entry.is_fresh(policy))
            .unwrap_or(false)
    }

    /// Marks every entry under `prefix` stale
    ///
    /// Values stay readable through `get` until refetched.
    ///
    /// # Returns
    ///
    /// The number of entries affected
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.lock();
        entries.generation += 1;
        let mut count = 0;
        for (key, entry) in entries.map.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!("Invalidated {} entries under {}", count, prefix);
        count
    }

    /// Drops every entry
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.generation += 1;
        entries.map.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().map.is_empty()
    }

    fn fresh<T>(&self, key: &QueryKey, policy: &QueryPolicy) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let entries = self.lock();
        let entry = entries.map.get(key).filter(|entry| entry.is_fresh(policy))?;
        entry.value.clone().downcast::<T>().ok()
    }

    fn store(&self, key: QueryKey, value: Arc<dyn Any + Send + Sync>) {
        self.lock().map.insert(key, Entry::new(value));
    }

    fn store_if_current(&self, key: QueryKey, value: Arc<dyn Any + Send + Sync>, generation: u64) {
        let mut entries = self.lock();
        if entries.generation != generation {
            tracing::debug!("Discarding {} fetched across an invalidation", key);
            return;
        }
        entries.map.insert(key, Entry::new(value));
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Notify;

    fn key(segments: &[&str]) -> QueryKey {
        QueryKey::new(segments.iter().copied())
    }

    async fn counted(calls: &AtomicU32, value: u32) -> Result<u32, ApiError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_fresh_entry_is_served_from_cache() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);
        let policy = QueryPolicy::minutes(5);
        let k = key(&["companies", "list"]);

        let first = cache.fetch(&k, &policy, || counted(&calls, 1)).await.unwrap();
        let second = cache.fetch(&k, &policy, || counted(&calls, 2)).await.unwrap();

        assert_eq!(*first, 1);
        assert_eq!(*second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);
        let k = key(&["scraping-status"]);

        cache.fetch(&k, &QueryPolicy::always(), || counted(&calls, 1)).await.unwrap();
        let second = cache
            .fetch(&k, &QueryPolicy::always(), || counted(&calls, 2))
            .await
            .unwrap();

        assert_eq!(*second, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let cache = QueryCache::new(Duration::ZERO);
        let policy = QueryPolicy::minutes(5);
        cache.set(key(&["companies", "list", "a"]), 1u32);
        cache.set(key(&["companies", "list", "b"]), 2u32);
        cache.set(key(&["company", "1"]), 3u32);

        assert_eq!(cache.invalidate(&QueryKey::root("companies")), 2);
        assert!(!cache.is_fresh(&key(&["companies", "list", "a"]), &policy));
        assert!(cache.is_fresh(&key(&["company", "1"]), &policy));
        // Stale values stay readable
        assert_eq!(*cache.get::<u32>(&key(&["companies", "list", "b"])).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_retryable_failure_is_retried_once() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);
        let k = key(&["sales-dashboard"]);

        let result = cache
            .fetch(&k, &QueryPolicy::minutes(2), || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ApiError::Timeout)
                } else {
                    Ok(7u32)
                }
            })
            .await;

        assert_eq!(*result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<Arc<u32>, ApiError> = cache
            .fetch(&key(&["company", "9"]), &QueryPolicy::minutes(5), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::from_status(404, ""))
            })
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_policy_without_retry() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        let result: Result<Arc<u32>, ApiError> = cache
            .fetch(&key(&["x"]), &QueryPolicy::minutes(1).without_retry(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Timeout)
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::default();
        cache.set(key(&["a"]), "x".to_string());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get::<String>(&key(&["a"])).is_none());
    }

    #[tokio::test]
    async fn test_fetch_across_clear_is_not_stored() {
        let cache = QueryCache::new(Duration::ZERO);
        let gate = Notify::new();
        let k = key(&["company", "1"]);

        let policy = QueryPolicy::minutes(5);
        let fetch = cache.fetch(&k, &policy, || async {
            gate.notified().await;
            Ok::<_, ApiError>(1u32)
        });
        let teardown = async {
            tokio::task::yield_now().await;
            cache.clear();
            gate.notify_one();
        };
        let (result, _) = tokio::join!(fetch, teardown);

        assert_eq!(*result.unwrap(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_across_invalidation_stays_stale() {
        let cache = QueryCache::new(Duration::ZERO);
        let gate = Notify::new();
        let policy = QueryPolicy::minutes(5);
        let k = key(&["companies", "list"]);
        cache.set(k.clone(), 1u32);
        cache.invalidate(&k);

        let fetch = cache.fetch(&k, &policy, || async {
            gate.notified().await;
            Ok::<_, ApiError>(2u32)
        });
        let mutation = async {
            tokio::task::yield_now().await;
            cache.invalidate(&QueryKey::root("companies"));
            gate.notify_one();
        };
        let (result, _) = tokio::join!(fetch, mutation);

        assert_eq!(*result.unwrap(), 2);
        assert!(!cache.is_fresh(&k, &policy));
    }

    #[test]
    fn test_type_mismatch_reads_as_missing() {
        let cache = QueryCache::default();
        cache.set(key(&["a"]), 1u32);
        assert!(cache.get::<String>(&key(&["a"])).is_none());
    }
}
