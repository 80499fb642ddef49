use anyhow::{Context, Result};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use ykk_utils::{DraftStoreConfig, StorageBackend};

/// String key-value store behind the draft service.
#[derive(Clone)]
pub enum KvBackend {
    Memory(Arc<RwLock<HashMap<String, String>>>),
    Redis(ConnectionManager),
}

impl KvBackend {
    pub fn memory() -> Self {
        Self::Memory(Arc::new(RwLock::new(HashMap::new())))
    }

    pub async fn redis(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).context("Invalid Redis URL")?;
        let connection_manager = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Connected to Redis draft store");
        Ok(Self::Redis(connection_manager))
    }

    pub async fn connect(config: &DraftStoreConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory draft store, data is lost on restart");
                Ok(Self::memory())
            }
            StorageBackend::Redis => Self::redis(&config.redis_url).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Self::Memory(map) => Ok(map.read().await.get(key).cloned()),
            Self::Redis(manager) => {
                let mut conn = manager.clone();
                conn.get(key)
                    .await
                    .with_context(|| format!("Failed to read key {}", key))
            }
        }
    }

    pub async fn set(&self, key: &str, value: String) -> Result<()> {
        match self {
            Self::Memory(map) => {
                map.write().await.insert(key.to_string(), value);
                Ok(())
            }
            Self::Redis(manager) => {
                let mut conn = manager.clone();
                conn.set(key, value)
                    .await
                    .with_context(|| format!("Failed to write key {}", key))
            }
        }
    }

    /// Returns whether the key existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        match self {
            Self::Memory(map) => Ok(map.write().await.remove(key).is_some()),
            Self::Redis(manager) => {
                let mut conn = manager.clone();
                let removed: i64 = conn
                    .del(key)
                    .await
                    .with_context(|| format!("Failed to delete key {}", key))?;
                Ok(removed > 0)
            }
        }
    }

    pub async fn ping(&self) -> Result<()> {
        match self {
            Self::Memory(_) => Ok(()),
            Self::Redis(manager) => {
                let mut conn = manager.clone();
                let _: String = redis::cmd("PING")
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))?;
                Ok(())
            }
        }
    }
}
