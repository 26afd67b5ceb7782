use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::lock::Mutex;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::time::timeout;

use super::{CacheError, CacheLayer};
use crate::error::AppError;

/// Upper bound on connecting and on each command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Cache shared through a Redis server.
///
/// One `ConnectionManager` is created on first use and shared by every call;
/// it reconnects on its own after the server drops. A failed connect leaves
/// the slot empty so the next call tries again.
pub struct RedisCache {
    client: Client,
    manager: Mutex<Option<ConnectionManager>>,
    timeout: Duration,
}

impl RedisCache {
    /// Validates the URL; does not connect.
    pub fn open(url: &str) -> Result<Self, AppError> {
        let client = Client::open(url)
            .map_err(|e| AppError::Config(format!("Invalid REDIS_URL: {}", e)))?;
        Ok(Self {
            client,
            manager: Mutex::new(None),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let mut slot = self.manager.lock().await;
        if let Some(manager) = slot.as_ref() {
            return Ok(manager.clone());
        }

        let manager = self
            .bounded(ConnectionManager::new(self.client.clone()))
            .await?;
        log::info!("connected to redis");
        *slot = Some(manager.clone());
        Ok(manager)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, CacheError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CacheError::Unavailable(format!(
                "no reply from redis within {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = self.bounded(conn.set(key, value)).await?;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: () = self.bounded(conn.del(key)).await?;
        Ok(())
    }
}
