//! In-memory cache implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use gisthub_core::config::CacheConfig;
use gisthub_core::error::AppError;
use gisthub_core::result::AppResult;
use gisthub_core::traits::cache::CacheProvider;

/// A cached value together with the TTL it was stored with.
#[derive(Debug, Clone)]
struct Entry {
    data: Bytes,
    ttl: Duration,
}

/// Expires each entry after its own TTL.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Entry>,
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(config.default_ttl_seconds),
        }
    }

    async fn insert(&self, key: &str, data: Bytes, ttl: Duration) {
        self.cache
            .insert(key.to_string(), Entry { data, ttl })
            .await;
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match self.cache.get(key).await {
            Some(entry) => String::from_utf8(entry.data.to_vec())
                .map(Some)
                .map_err(|e| AppError::cache(format!("Cached value for '{key}' is not UTF-8: {e}"))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.insert(key, Bytes::copy_from_slice(value.as_bytes()), ttl)
            .await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn get_bytes(&self, key: &str) -> AppResult<Option<Bytes>> {
        Ok(self.cache.get(key).await.map(|entry| entry.data))
    }

    async fn set_bytes(&self, key: &str, value: Bytes, ttl: Duration) -> AppResult<()> {
        self.insert(key, value, ttl).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> AppResult<u64> {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.to_string())
            .collect();

        let mut count = 0u64;
        for key in keys {
            if self.cache.remove(&key).await.is_some() {
                count += 1;
            }
        }

        debug!(prefix, count, "Deleted keys with prefix");
        Ok(count)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let data = Bytes::copy_from_slice(value.as_bytes());
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(async move { Entry { data, ttl } })
            .await;
        Ok(entry.is_fresh())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
