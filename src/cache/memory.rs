use async_trait::async_trait;
use moka::future::Cache;

use super::{CacheError, CacheLayer};

/// In-process cache. Entries have no TTL and leave only through `invalidate`
/// or capacity eviction.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().max_capacity(64).build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_get_set_invalidate() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("tasks").await.unwrap(), None);

        cache.set("tasks", "[]".to_string()).await.unwrap();
        assert_eq!(cache.get("tasks").await.unwrap().as_deref(), Some("[]"));

        cache.set("tasks", "[1]".to_string()).await.unwrap();
        assert_eq!(cache.get("tasks").await.unwrap().as_deref(), Some("[1]"));

        cache.invalidate("tasks").await.unwrap();
        assert_eq!(cache.get("tasks").await.unwrap(), None);

        // Invalidating an absent key is not an error.
        cache.invalidate("tasks").await.unwrap();
    }
}
