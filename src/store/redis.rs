//! Redis Store Backend
//!
//! Persistent implementation of the store contract over a pooled Redis
//! connection. Documents are JSON values keyed as
//! `{namespace}:{cache_type}:{cache_key}`, so each cache type occupies its
//! own key-prefix partition. Absolute expiry is set with `SET ... EXAT`,
//! letting the engine reclaim expired documents on its own; reads still
//! apply the lazy expiry filter before surfacing an entry.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;

use crate::cache::{CacheEntry, TypeStats};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::store::Store;

// == Redis Store ==
/// Redis-backed store sharing one connection pool process-wide.
///
/// Building the store creates the pool but does not dial: connectivity
/// problems (including a missing URL) surface as `StoreUnavailable` on
/// first use, per the fail-open contract.
pub struct RedisStore {
    pool: Pool,
    namespace: String,
}

impl RedisStore {
    // == Constructor ==
    /// Builds the store from configuration.
    ///
    /// # Errors
    /// `StoreUnavailable` if no store URL is configured or the URL cannot
    /// be parsed into a pool configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let url = config
            .store_url
            .as_deref()
            .ok_or_else(|| CacheError::StoreUnavailable("CACHE_STORE_URL is not set".into()))?;

        let mut pool_config = deadpool_redis::Config::from_url(url);
        // from_url leaves the pool section unset; it must exist for the
        // size and timeout knobs to take effect.
        let pool = pool_config.pool.get_or_insert_with(PoolConfig::default);
        pool.max_size = config.store_pool_size;
        let timeout = Duration::from_millis(config.store_timeout_ms);
        pool.timeouts.wait = Some(timeout);
        pool.timeouts.create = Some(timeout);
        pool.timeouts.recycle = Some(timeout);

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(unavailable)?;

        Ok(Self {
            pool,
            namespace: config.namespace.clone(),
        })
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool.get().await.map_err(unavailable)
    }

    fn entry_key(&self, cache_type: &str, cache_key: &str) -> String {
        format!("{}:{}:{}", self.namespace, cache_type, cache_key)
    }

    fn type_pattern(&self, cache_type: &str) -> String {
        format!("{}:{}:*", self.namespace, cache_type)
    }

    fn all_pattern(&self) -> String {
        format!("{}:*", self.namespace)
    }

    /// Extracts the cache type from a namespaced key.
    fn cache_type_of<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(&self.namespace)?
            .strip_prefix(':')?
            .split(':')
            .next()
    }

    async fn scan_keys(&self, conn: &mut Connection, pattern: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut iter = conn
            .scan_match::<_, String>(pattern)
            .await
            .map_err(unavailable)?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let keys = self.scan_keys(&mut conn, pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let removed: u64 = conn.del(keys).await.map_err(unavailable)?;
        Ok(removed)
    }
}

fn unavailable(err: impl Display) -> CacheError {
    CacheError::StoreUnavailable(err.to_string())
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, cache_type: &str, cache_key: &str) -> Result<Option<CacheEntry>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(self.entry_key(cache_type, cache_key))
            .await
            .map_err(unavailable)?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let entry: CacheEntry = serde_json::from_str(&raw)?;

        // The engine expires keys at expires_at, but apply the lazy filter
        // anyway so a not-yet-reclaimed document is never surfaced.
        if entry.is_expired() {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        let key = self.entry_key(&entry.cache_type, &entry.cache_key);
        let document = serde_json::to_string(entry)?;
        let mut conn = self.conn().await?;

        // Single SET with absolute expiry: the write and its TTL land
        // atomically, so a cancelled call never leaves a partial document.
        redis::cmd("SET")
            .arg(&key)
            .arg(&document)
            .arg("EXAT")
            .arg(entry.expires_at.timestamp())
            .query_async::<()>(&mut conn)
            .await
            .map_err(unavailable)?;

        Ok(())
    }

    async fn delete(&self, cache_type: &str, cache_key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let removed: u64 = conn
            .del(self.entry_key(cache_type, cache_key))
            .await
            .map_err(unavailable)?;
        Ok(removed > 0)
    }

    async fn clear_type(&self, cache_type: &str) -> Result<u64> {
        self.delete_matching(&self.type_pattern(cache_type)).await
    }

    async fn clear_all(&self) -> Result<u64> {
        self.delete_matching(&self.all_pattern()).await
    }

    async fn stats(&self, cache_type: Option<&str>) -> Result<Vec<TypeStats>> {
        let pattern = match cache_type {
            Some(t) => self.type_pattern(t),
            None => self.all_pattern(),
        };

        let mut conn = self.conn().await?;
        let keys = self.scan_keys(&mut conn, &pattern).await?;

        let mut stats: Vec<TypeStats> = Vec::new();
        for key in keys {
            let Some(entry_type) = self.cache_type_of(&key) else {
                continue;
            };
            let size: u64 = conn.strlen(&key).await.map_err(unavailable)?;

            match stats.iter_mut().find(|s| s.cache_type == entry_type) {
                Some(existing) => {
                    existing.entries += 1;
                    existing.approx_bytes += size;
                }
                None => stats.push(TypeStats {
                    cache_type: entry_type.to_string(),
                    entries: 1,
                    approx_bytes: size,
                }),
            }
        }

        Ok(stats)
    }

    async fn purge_expired(&self) -> Result<u64> {
        // Expiry is delegated to the engine via EXAT; nothing to sweep here.
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RedisStore {
        let config = Config {
            store_url: Some("redis://127.0.0.1:6379/".to_string()),
            ..Config::default()
        };
        RedisStore::from_config(&config).unwrap()
    }

    #[test]
    fn test_from_config_requires_url() {
        let result = RedisStore::from_config(&Config::default());
        assert!(matches!(result, Err(CacheError::StoreUnavailable(_))));
    }

    #[test]
    fn test_key_layout_partitions_by_type() {
        let store = store();

        assert_eq!(
            store.entry_key("google_geocoding", "abc"),
            "place_cache:google_geocoding:abc"
        );
        assert_eq!(
            store.type_pattern("google_geocoding"),
            "place_cache:google_geocoding:*"
        );
        assert_eq!(store.all_pattern(), "place_cache:*");
    }

    #[test]
    fn test_pool_honors_configured_size() {
        let config = Config {
            store_url: Some("redis://127.0.0.1:6379/".to_string()),
            store_pool_size: 3,
            ..Config::default()
        };

        let store = RedisStore::from_config(&config).unwrap();
        assert_eq!(store.pool.status().max_size, 3);
    }

    #[test]
    fn test_cache_type_parsed_from_key() {
        let store = store();

        assert_eq!(
            store.cache_type_of("place_cache:google_geocoding:abc123"),
            Some("google_geocoding")
        );
        assert_eq!(store.cache_type_of("other_ns:google_geocoding:abc"), None);
    }
}
