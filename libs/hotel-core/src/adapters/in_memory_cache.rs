use crate::{Cache, CoreError};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct CachedValue {
    bytes: Vec<u8>,
    ttl: Option<Duration>,
}

/// Expires each entry after the TTL it was written with; entries written
/// without one fall back to the cache-wide time-to-live.
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-memory implementation of the Cache port using Moka.
/// Suitable for testing and single-executable mode.
#[derive(Clone, Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CachedValue>,
}

impl InMemoryCache {
    /// Creates a new InMemoryCache with specific capacity and default TTL settings.
    pub fn new(max_capacity: u64, default_ttl_seconds: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(default_ttl_seconds))
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl Default for InMemoryCache {
    /// Creates a new InMemoryCache with default capacity (10,000) and TTL (1 hour).
    fn default() -> Self {
        Self::new(10_000, 3600)
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(self.cache.get(key).await.map(|value| value.bytes))
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl_seconds: Option<u64>,
    ) -> Result<(), CoreError> {
        self.cache
            .insert(
                key.to_string(),
                CachedValue {
                    bytes: value.to_vec(),
                    ttl: ttl_seconds.map(Duration::from_secs),
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}
