//! Aggregate cache access for receivable-service.
//!
//! The dashboard aggregates live in Redis; writes are best-effort with no
//! read-back verification, so a missed write only lasts until the next
//! refresh tick.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};

#[async_trait]
pub trait AggregateCache: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error>;
    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

#[derive(Clone)]
pub struct RedisCache {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn new(url: &str) -> Result<Self, anyhow::Error> {
        tracing::info!(url = %url, "Connecting to Redis");
        let client = Client::open(url.to_string())?;

        // Use ConnectionManager for automatic reconnection
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }
}

#[async_trait]
impl AggregateCache for RedisCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to set cache key {}: {}", key, e))
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))
    }
}

#[derive(Default)]
pub struct MockCache {
    pub entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
    pub fail_writes: std::sync::atomic::AtomicBool,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

#[async_trait]
impl AggregateCache for MockCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(anyhow::anyhow!("mock cache write failure"));
        }
        self.entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock cache mutex poisoned: {}", e))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}
