//! Cache storage for rendered query results.
//!
//! A [`CacheClient`] pairs a byte-level [`CacheStore`] with a [`Codec`]. Cached
//! reads are keyed by [`SelectClause::cache_key`](crate::SelectClause::cache_key)
//! and dropped by the wildcard patterns mutations produce.

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

use crate::error::QeResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Byte-level key/value store with pattern deletion.
///
/// Patterns use Redis `MATCH` syntax: `*`, `?`, `[...]` and `\` escapes.
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`. `None` means no expiry.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = QeResult<()>> + Send;

    /// Fetch the value under `key`, if present and not expired.
    fn get(&self, key: &str) -> impl std::future::Future<Output = QeResult<Option<Vec<u8>>>> + Send;

    /// Delete every key matching `pattern` and return how many were removed.
    fn unlink_matching(
        &self,
        pattern: &str,
    ) -> impl std::future::Future<Output = QeResult<u64>> + Send;
}

/// Encoding of cached values.
pub trait Codec: Send + Sync {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> QeResult<Vec<u8>>;
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> QeResult<T>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> QeResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> QeResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Typed cache access over a store and codec.
#[derive(Debug, Clone)]
pub struct CacheClient<S, C = JsonCodec> {
    store: S,
    codec: C,
}

impl<S: CacheStore> CacheClient<S> {
    /// Create a client using [`JsonCodec`].
    pub fn new(store: S) -> Self {
        Self {
            store,
            codec: JsonCodec,
        }
    }
}

impl<S: CacheStore, C: Codec> CacheClient<S, C> {
    pub fn with_codec(store: S, codec: C) -> Self {
        Self { store, codec }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encode and store `value`.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> QeResult<()> {
        let bytes = self.codec.encode(value)?;
        self.store.set(key, bytes, ttl).await
    }

    /// Fetch and decode the value under `key`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> QeResult<Option<T>> {
        match self.store.get(key).await? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete every key matching any of `patterns`.
    ///
    /// Returns the total number of keys removed.
    pub async fn unlink_keys(&self, patterns: &[String]) -> QeResult<u64> {
        let mut removed = 0;
        for pattern in patterns {
            let n = self.store.unlink_matching(pattern).await?;
            tracing::debug!(target: "qeutil.cache", pattern = %pattern, removed = n, "invalidated keys");
            removed += n;
        }
        Ok(removed)
    }
}
