//! Cache provider trait for pluggable caching backends.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for cache backends.
///
/// String values are used for small markers (token blocklist entries),
/// byte values for rendered artifacts such as preview images.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value with the default TTL.
    async fn set_default(&self, key: &str, value: &str) -> AppResult<()>;

    /// Get raw bytes by key.
    async fn get_bytes(&self, key: &str) -> AppResult<Option<Bytes>>;

    /// Store raw bytes with a TTL.
    async fn set_bytes(&self, key: &str, value: Bytes, ttl: Duration) -> AppResult<()>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Delete every key starting with `prefix`. Returns the number of keys removed.
    async fn delete_prefix(&self, prefix: &str) -> AppResult<u64>;

    /// Check whether a key exists in the cache.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Store `value` only when `key` is absent. Returns `true` if this call
    /// inserted it; concurrent callers for the same key see exactly one `true`.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Check that the cache backend is usable.
    async fn health_check(&self) -> AppResult<bool>;
}
