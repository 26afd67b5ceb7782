//! Key-value cache in front of the task list.
//!
//! Backends implement [`CacheLayer`]; [`CacheAside`] is the only code that talks
//! to them, so the read-through and repopulate-after-mutation rules live in one
//! place. A failing backend never fails a request.

pub mod aside;
pub mod memory;
pub mod redis;

pub use aside::CacheAside;
pub use memory::MemoryCache;
pub use self::redis::RedisCache;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::CacheBackend;
use crate::error::AppError;

/// Key under which the serialized task list is stored.
pub const TASKS_KEY: &str = "tasks";

#[derive(Debug)]
pub enum CacheError {
    /// The backend could not be reached or rejected the command.
    Unavailable(String),
    /// A stored value could not be encoded or decoded.
    Corrupt(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CacheError::Unavailable(msg) => write!(f, "cache unavailable: {}", msg),
            CacheError::Corrupt(msg) => write!(f, "corrupt cache value: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<::redis::RedisError> for CacheError {
    fn from(error: ::redis::RedisError) -> Self {
        CacheError::Unavailable(error.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Corrupt(error.to_string())
    }
}

/// A shared string cache. Each call is atomic on its own; nothing orders
/// calls made by different requests.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Short backend label for logs and the health report.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` with no expiry.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}

/// Builds the configured backend, or `None` when caching is disabled.
pub fn from_backend(backend: &CacheBackend) -> Result<Option<Arc<dyn CacheLayer>>, AppError> {
    let cache: Option<Arc<dyn CacheLayer>> = match backend {
        CacheBackend::Disabled => None,
        CacheBackend::Memory => Some(Arc::new(MemoryCache::new())),
        CacheBackend::Redis(url) => Some(Arc::new(RedisCache::open(url)?)),
    };
    Ok(cache)
}
