use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{CacheError, CacheLayer};
use crate::error::AppError;

/// Cache-aside policy around an optional [`CacheLayer`].
///
/// Reads go through [`CacheAside::read_through`]; every mutation goes through
/// [`CacheAside::write_through`], which recomputes the cached view after the
/// mutation commits. Cache failures are logged and otherwise ignored, so the
/// results are the same with or without a working cache.
#[derive(Clone)]
pub struct CacheAside {
    cache: Option<Arc<dyn CacheLayer>>,
    // Bumped after every committed mutation. A read that started before the
    // bump must not write its (older) result back.
    generation: Arc<AtomicU64>,
}

impl CacheAside {
    pub fn new(cache: Option<Arc<dyn CacheLayer>>) -> Self {
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.as_ref().map_or("disabled", |cache| cache.name())
    }

    /// Returns the cached value for `key`, or runs `load` and caches its result.
    pub async fn read_through<T, F, Fut>(&self, key: &str, load: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.lookup::<T>(key).await {
            log::debug!("cache hit for '{}'", key);
            return Ok(hit);
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let value = load().await?;
        if self.generation.load(Ordering::SeqCst) != seen {
            log::debug!("skipping cache fill for '{}': a mutation committed meanwhile", key);
            return Ok(value);
        }

        self.store(key, &value).await;
        // A mutation may have committed and refreshed the key while our set
        // was in flight, in which case our value is the older one.
        if self.generation.load(Ordering::SeqCst) != seen {
            log::debug!("cache fill for '{}' raced a mutation, invalidating", key);
            self.invalidate(key).await;
        }
        Ok(value)
    }

    /// Runs `mutation`; once it succeeds, repopulates `key` with `recompute`.
    ///
    /// If recomputing or storing fails, or a later mutation commits before the
    /// set completes, the key is invalidated instead. A failed mutation leaves
    /// the cache untouched and its error is returned as is.
    pub async fn write_through<T, V, M, R, RFut>(
        &self,
        key: &str,
        mutation: M,
        recompute: R,
    ) -> Result<T, AppError>
    where
        M: Future<Output = Result<T, AppError>>,
        R: FnOnce() -> RFut,
        RFut: Future<Output = Result<V, AppError>>,
        V: Serialize,
    {
        let outcome = mutation.await?;
        let current = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if self.cache.is_none() {
            return Ok(outcome);
        }

        match recompute().await {
            Ok(value) => {
                let stored = self.store(key, &value).await;
                if !stored || self.generation.load(Ordering::SeqCst) != current {
                    self.invalidate(key).await;
                }
            }
            Err(e) => {
                log::warn!("could not recompute '{}' after mutation: {}", key, e);
                self.invalidate(key).await;
            }
        }
        Ok(outcome)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        let raw = match cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("cache read for '{}' failed, using the store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("{}", CacheError::from(e));
                self.invalidate(key).await;
                None
            }
        }
    }

    async fn store<V: Serialize>(&self, key: &str, value: &V) -> bool {
        let Some(cache) = self.cache.as_ref() else {
            return true;
        };

        let result = match serde_json::to_string(value) {
            Ok(raw) => cache.set(key, raw).await,
            Err(e) => Err(CacheError::from(e)),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("cache write for '{}' failed: {}", key, e);
                false
            }
        }
    }

    async fn invalidate(&self, key: &str) {
        if let Some(cache) = self.cache.as_ref() {
            if let Err(e) = cache.invalidate(key).await {
                log::error!("cache invalidation for '{}' failed: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// A backend that is always down.
    struct BrokenCache;

    #[async_trait]
    impl CacheLayer for BrokenCache {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        async fn invalidate(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    fn memory() -> (Arc<MemoryCache>, CacheAside) {
        let cache = Arc::new(MemoryCache::new());
        let aside = CacheAside::new(Some(cache.clone() as Arc<dyn CacheLayer>));
        (cache, aside)
    }

    #[actix_rt::test]
    async fn test_read_through_populates_on_miss() {
        let (cache, aside) = memory();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Vec<i32> = aside
                .read_through("k", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(value, vec![1, 2, 3]);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[actix_rt::test]
    async fn test_write_through_repopulates() {
        let (cache, aside) = memory();
        cache.set("k", "[1]".to_string()).await.unwrap();

        let outcome = aside
            .write_through("k", async { Ok("created") }, || async { Ok(vec![1, 2]) })
            .await
            .unwrap();

        assert_eq!(outcome, "created");
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[actix_rt::test]
    async fn test_failed_mutation_leaves_cache_alone() {
        let (cache, aside) = memory();
        cache.set("k", "[1]".to_string()).await.unwrap();

        let result: Result<(), AppError> = aside
            .write_through(
                "k",
                async { Err(AppError::NotFound("Task not found".into())) },
                || async { Ok(Vec::<i32>::new()) },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("[1]"));
    }

    #[actix_rt::test]
    async fn test_failed_recompute_invalidates() {
        let (cache, aside) = memory();
        cache.set("k", "[1]".to_string()).await.unwrap();

        aside
            .write_through("k", async { Ok(()) }, || async {
                Err::<Vec<i32>, _>(AppError::DatabaseError("disk I/O error".into()))
            })
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_corrupt_entry_is_treated_as_miss() {
        let (cache, aside) = memory();
        cache.set("k", "not json".to_string()).await.unwrap();

        let value: Vec<i32> = aside
            .read_through("k", || async { Ok(vec![4]) })
            .await
            .unwrap();

        assert_eq!(value, vec![4]);
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("[4]"));
    }

    #[actix_rt::test]
    async fn test_read_racing_a_mutation_does_not_fill() {
        let (cache, aside) = memory();

        let value: Vec<i32> = aside
            .read_through("k", || async {
                // A mutation commits while this read is loading the old list.
                aside
                    .write_through("k", async { Ok(()) }, || async { Ok(vec![1, 2]) })
                    .await?;
                Ok(vec![1])
            })
            .await
            .unwrap();

        assert_eq!(value, vec![1]);
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("[1,2]"));
    }

    /// Memory backend whose first `set` yields to the executor a few times
    /// before it lands, so a concurrent writer can finish first.
    struct SlowFirstSet {
        inner: MemoryCache,
        sets: AtomicUsize,
    }

    #[async_trait]
    impl CacheLayer for SlowFirstSet {
        fn name(&self) -> &'static str {
            "slow-first-set"
        }

        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
            if self.sets.fetch_add(1, Ordering::SeqCst) == 0 {
                for _ in 0..10 {
                    tokio::task::yield_now().await;
                }
            }
            self.inner.set(key, value).await
        }

        async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
            self.inner.invalidate(key).await
        }
    }

    fn slow_first_set() -> (Arc<SlowFirstSet>, CacheAside) {
        let cache = Arc::new(SlowFirstSet {
            inner: MemoryCache::new(),
            sets: AtomicUsize::new(0),
        });
        let aside = CacheAside::new(Some(cache.clone() as Arc<dyn CacheLayer>));
        (cache, aside)
    }

    #[actix_rt::test]
    async fn test_slow_fill_does_not_overwrite_fresher_list() {
        let (cache, aside) = slow_first_set();

        let (read, written) = futures::join!(
            aside.read_through("k", || async { Ok(vec![1]) }),
            aside.write_through("k", async { Ok(()) }, || async { Ok(vec![1, 2]) }),
        );
        assert_eq!(read.unwrap(), vec![1]);
        written.unwrap();

        assert_ne!(cache.get("k").await.unwrap().as_deref(), Some("[1]"));
        let value: Vec<i32> = aside
            .read_through("k", || async { Ok(vec![1, 2]) })
            .await
            .unwrap();
        assert_eq!(value, vec![1, 2]);
    }

    #[actix_rt::test]
    async fn test_slow_recompute_does_not_overwrite_later_mutation() {
        let (cache, aside) = slow_first_set();

        let (first, second) = futures::join!(
            aside.write_through("k", async { Ok(()) }, || async { Ok(vec![1]) }),
            aside.write_through("k", async { Ok(()) }, || async { Ok(vec![1, 2]) }),
        );
        first.unwrap();
        second.unwrap();

        assert_ne!(cache.get("k").await.unwrap().as_deref(), Some("[1]"));
    }

    #[actix_rt::test]
    async fn test_broken_backend_degrades_to_store() {
        let aside = CacheAside::new(Some(Arc::new(BrokenCache)));

        let value: Vec<i32> = aside
            .read_through("k", || async { Ok(vec![7]) })
            .await
            .unwrap();
        assert_eq!(value, vec![7]);

        let outcome = aside
            .write_through("k", async { Ok(5) }, || async { Ok(vec![7, 8]) })
            .await
            .unwrap();
        assert_eq!(outcome, 5);
    }

    #[actix_rt::test]
    async fn test_disabled_cache_never_recomputes() {
        let aside = CacheAside::disabled();
        assert!(!aside.is_enabled());
        assert_eq!(aside.backend_name(), "disabled");
        let recomputes = AtomicUsize::new(0);

        aside
            .write_through("k", async { Ok(()) }, || async {
                recomputes.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::<i32>::new())
            })
            .await
            .unwrap();

        assert_eq!(recomputes.load(Ordering::SeqCst), 0);
    }
}
