//! In-process cache store.

use super::CacheStore;
use crate::error::{QeError, QeResult};
use glob::Pattern;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// A [`CacheStore`] kept in a process-local map.
///
/// Expired entries are dropped lazily on read and during invalidation scans.
/// Suited to tests and single-instance deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl CacheStore for MemoryStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> QeResult<()> {
        let entry = Entry {
            bytes: value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> QeResult<Option<Vec<u8>>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.bytes.clone())),
                Some(_) => {}
            }
        }
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn unlink_matching(&self, pattern: &str) -> QeResult<u64> {
        let matcher = redis_to_glob(pattern)?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let mut removed = 0;
        entries.retain(|key, entry| {
            if !entry.is_live(now) {
                return false;
            }
            if matcher.matches(key) {
                removed += 1;
                return false;
            }
            true
        });
        Ok(removed)
    }
}

/// Translate a Redis `MATCH` pattern into a [`glob::Pattern`].
///
/// Backslash escapes become bracketed literals, `[^...]` becomes `[!...]` and
/// runs of `*` collapse to one, since `glob` rejects `**` outside path segments.
fn redis_to_glob(pattern: &str) -> QeResult<Pattern> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    out.push_str(&Pattern::escape("\\"));
                    break;
                };
                if in_class {
                    out.push(escaped);
                } else {
                    out.push_str(&Pattern::escape(&escaped.to_string()));
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push('[');
                let mut rest = chars.clone();
                if rest.next() == Some('^') {
                    out.push('!');
                    chars = rest;
                }
            }
            '*' if out.ends_with('*') => {}
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            _ => out.push(c),
        }
    }

    Pattern::new(&out).map_err(|e| QeError::cache(format!("invalid key pattern {pattern:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheClient;
    use crate::clause::{DeleteClause, Mutation, SelectClause, UpdateClause};
    use crate::predicate::Predicate;

    #[test]
    fn translates_redis_escapes() {
        let p = redis_to_glob(r"posts:*[:&]tag=\[a,b\]*").unwrap();
        assert!(p.matches("posts:where:tag=[a,b]"));
        assert!(p.matches("posts:where:id=1&tag=[a,b]:lim:10"));
        assert!(!p.matches("posts:where:tag=a"));
    }

    #[test]
    fn translates_negated_class() {
        let p = redis_to_glob("k[^ab]").unwrap();
        assert!(p.matches("kc"));
        assert!(!p.matches("ka"));
    }

    #[tokio::test]
    async fn set_get_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", b"1".to_vec(), None).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire() {
        let store = MemoryStore::new();
        store
            .set("a", b"1".to_vec(), Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(store.get("a").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn mutation_patterns_unlink_matching_reads() {
        let cache = CacheClient::new(MemoryStore::new());

        let by_user = SelectClause::new("orders")
            .filter(Predicate::eq("user_id", 7).unwrap())
            .filter(Predicate::gt("total", 100).unwrap())
            .limit(10);
        let by_status = SelectClause::new("orders")
            .filter(Predicate::eq("status", "open").unwrap());
        let other_user = SelectClause::new("orders")
            .filter(Predicate::eq("user_id", 8).unwrap());

        for sc in [&by_user, &by_status, &other_user] {
            cache
                .set(&sc.cache_key().unwrap(), &vec![1, 2, 3], None)
                .await
                .unwrap();
        }

        let update = UpdateClause::new("orders")
            .set("total", 0)
            .filter(Predicate::eq("user_id", 7).unwrap());
        let removed = cache.unlink_keys(&update.invalidation_patterns()).await.unwrap();

        assert_eq!(removed, 1);
        let gone: Option<Vec<i32>> = cache.get(&by_user.cache_key().unwrap()).await.unwrap();
        assert!(gone.is_none());
        let kept: Option<Vec<i32>> = cache.get(&other_user.cache_key().unwrap()).await.unwrap();
        assert_eq!(kept, Some(vec![1, 2, 3]));
        assert_eq!(cache.store().len().await, 2);
    }

    #[tokio::test]
    async fn escaped_values_still_invalidate() {
        let cache = CacheClient::new(MemoryStore::new());
        let key = SelectClause::new("users")
            .filter(Predicate::eq("name", "a:b&c").unwrap())
            .limit(5)
            .cache_key()
            .unwrap();
        cache.set(&key, "cached", None).await.unwrap();

        let update = UpdateClause::new("users")
            .set("age", 1)
            .filter(Predicate::eq("name", "a:b&c").unwrap());
        assert_eq!(cache.unlink_keys(&update.invalidation_patterns()).await.unwrap(), 1);
        assert!(cache.store().is_empty().await);
    }

    #[test]
    fn collapses_repeated_stars() {
        let p = redis_to_glob("a**b").unwrap();
        assert!(p.matches("ab"));
        assert!(p.matches("a:x:b"));
        assert!(!p.matches("a:x:c"));

        let p = redis_to_glob(r"a*\**").unwrap();
        assert!(p.matches("a*"));
        assert!(p.matches("ax*yz"));
        assert!(!p.matches("axyz"));
    }

    #[tokio::test]
    async fn pattern_does_not_cross_tables() {
        let cache = CacheClient::new(MemoryStore::new());
        let key = SelectClause::new("orders_archive")
            .filter(Predicate::eq("user_id", 7).unwrap())
            .cache_key()
            .unwrap();
        cache.set(&key, "cached", None).await.unwrap();

        let delete = DeleteClause::new("orders").filter(Predicate::eq("user_id", 7).unwrap());
        assert_eq!(cache.unlink_keys(&delete.invalidation_patterns()).await.unwrap(), 0);
        assert_eq!(cache.store().len().await, 1);
    }
}
