//! Redis-backed cache store.

use super::CacheStore;
use crate::error::{QeError, QeResult};
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Keys fetched per `SCAN` round trip.
const SCAN_COUNT: usize = 500;

/// [`CacheStore`] over a multiplexed Redis connection.
///
/// Invalidation walks the keyspace with `SCAN ... MATCH` and removes matches
/// with `UNLINK`, so large deletions never block the server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to `redis_url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(redis_url: &str) -> QeResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| QeError::Connection(format!("invalid redis url: {e}")))?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!(target: "qeutil.cache", "connected to redis");
        Ok(Self { conn })
    }
}

impl CacheStore for RedisStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> QeResult<()> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            // PX 0 is rejected by the server.
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            cmd.arg("PX").arg(millis);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> QeResult<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn unlink_matching(&self, pattern: &str) -> QeResult<u64> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let n: u64 = redis::cmd("UNLINK").arg(&keys).query_async(&mut conn).await?;
                removed += n;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }
}
