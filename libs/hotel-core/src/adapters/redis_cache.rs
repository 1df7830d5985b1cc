use crate::{Cache, CoreError};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, aio::MultiplexedConnection};
use tracing::info;

const KEY_NAMESPACE: &str = "hotel";

fn infra(e: RedisError) -> CoreError {
    CoreError::Infrastructure(Box::new(e))
}

/// Cache port backed by Redis. Every key is stored under `hotel:` so the
/// server can share a Redis database with other services.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
    default_ttl_seconds: u64,
}

impl RedisCache {
    pub async fn new(redis_url: &str, default_ttl_seconds: u64) -> Result<Self, CoreError> {
        let client = Client::open(redis_url)
            .map_err(|e| CoreError::Configuration(format!("Invalid Redis URL: {}", e)))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(infra)?;
        info!(namespace = KEY_NAMESPACE, "Redis cache connected");
        Ok(Self {
            connection,
            default_ttl_seconds,
        })
    }

    fn namespaced(key: &str) -> String {
        format!("{KEY_NAMESPACE}:{key}")
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let mut conn = self.connection.clone();
        conn.get::<_, Option<Vec<u8>>>(Self::namespaced(key))
            .await
            .map_err(infra)
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl_seconds: Option<u64>,
    ) -> Result<(), CoreError> {
        // SET EX rejects 0
        let ttl = ttl_seconds.unwrap_or(self.default_ttl_seconds).max(1);
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(Self::namespaced(key), value, ttl)
            .await
            .map_err(infra)
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.connection.clone();
        let removed: usize = conn.del(Self::namespaced(key)).await.map_err(infra)?;
        if removed == 0 {
            tracing::trace!(key, "cache delete of absent key");
        }
        Ok(())
    }
}
