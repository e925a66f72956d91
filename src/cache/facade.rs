//! Cache Facade Module
//!
//! Single entry point composing key derivation, the TTL policy table, and
//! the store adapter.
//!
//! The hot path is fail-open: caching is a cost optimization, never a
//! correctness dependency, so key-derivation and store errors on `get`,
//! `set`, and `delete` are logged and degraded to a miss or no-op instead
//! of reaching the caller. The operator-facing `clear` and `stats` calls
//! propagate errors so outages stay discoverable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats};
use crate::config::Config;
use crate::error::Result;
use crate::key::{derive_key, CallArgs};
use crate::policy::ttl_for;
use crate::store::{RedisStore, Store};

// == Cache Facade ==
/// Process-wide cache facade.
///
/// Built once at startup and passed by reference to every consumer; the
/// underlying store connection pool is shared and lazily established on
/// first use.
pub struct Cache {
    store: Arc<dyn Store>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Cache {
    // == Constructors ==
    /// Creates a facade over an explicit store backend.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a facade over the configured persistent store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = RedisStore::from_config(config)?;
        Ok(Self::new(Arc::new(store)))
    }

    /// The underlying store, for the background sweep and health checks.
    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }

    // == Get ==
    /// Looks up the cached payload for `(cache_type, args)`.
    ///
    /// Fail-open: any key-derivation or store error is logged and reported
    /// as a miss so the caller proceeds to fetch fresh data.
    pub async fn get(&self, cache_type: &str, args: &CallArgs) -> Option<Value> {
        let cache_key = match derive_key(cache_type, args) {
            Ok(key) => key,
            Err(e) => {
                warn!(cache_type, error = %e, "key derivation failed, treating as miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        match self.store.get(cache_type, &cache_key).await {
            Ok(Some(entry)) => {
                debug!(cache_type, cache_key = %&cache_key[..16], "cache hit");
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.payload)
            }
            Ok(None) => {
                debug!(cache_type, cache_key = %&cache_key[..16], "cache miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                warn!(cache_type, error = %e, "store lookup failed, treating as miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    // == Set ==
    /// Caches a payload under `(cache_type, args)` with the policy TTL.
    ///
    /// Overwrites any existing entry for the same key. Errors are logged
    /// and swallowed: the caller already holds the fresh result, so a
    /// failed cache write must not fail its overall operation.
    pub async fn set(&self, cache_type: &str, payload: &impl Serialize, args: &CallArgs) {
        let cache_key = match derive_key(cache_type, args) {
            Ok(key) => key,
            Err(e) => {
                warn!(cache_type, error = %e, "key derivation failed, skipping cache write");
                return;
            }
        };
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(cache_type, error = %e, "payload not serializable, skipping cache write");
                return;
            }
        };

        let entry = CacheEntry::new(cache_type, &cache_key, payload, ttl_for(cache_type))
            .with_description(args.preview());

        match self.store.upsert(&entry).await {
            Ok(()) => {
                debug!(cache_type, cache_key = %&cache_key[..16], ttl_secs = entry.ttl_secs, "cached")
            }
            Err(e) => warn!(cache_type, error = %e, "cache write failed, continuing uncached"),
        }
    }

    // == Delete ==
    /// Removes the entry for `(cache_type, args)`.
    ///
    /// Returns whether an entry was removed; errors are logged and
    /// reported as `false`.
    pub async fn delete(&self, cache_type: &str, args: &CallArgs) -> bool {
        let cache_key = match derive_key(cache_type, args) {
            Ok(key) => key,
            Err(e) => {
                warn!(cache_type, error = %e, "key derivation failed, skipping delete");
                return false;
            }
        };

        match self.store.delete(cache_type, &cache_key).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(cache_type, error = %e, "cache delete failed");
                false
            }
        }
    }

    // == Clear ==
    /// Removes every entry for one cache type, or everything when `None`.
    pub async fn clear(&self, cache_type: Option<&str>) -> Result<u64> {
        match cache_type {
            Some(t) => self.store.clear_type(t).await,
            None => self.store.clear_all().await,
        }
    }

    // == Stats ==
    /// Reports hit/miss counters plus per-type storage figures.
    pub async fn stats(&self, cache_type: Option<&str>) -> Result<CacheStats> {
        let types = self.store.stats(cache_type).await?;
        Ok(CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            types,
        ))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TypeStats;
    use crate::error::CacheError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn memory_cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()))
    }

    /// Store double that fails every operation, for fail-open coverage.
    struct FailingStore;

    #[async_trait]
    impl Store for FailingStore {
        async fn get(&self, _: &str, _: &str) -> Result<Option<CacheEntry>> {
            Err(CacheError::StoreUnavailable("connection refused".into()))
        }
        async fn upsert(&self, _: &CacheEntry) -> Result<()> {
            Err(CacheError::StoreUnavailable("connection refused".into()))
        }
        async fn delete(&self, _: &str, _: &str) -> Result<bool> {
            Err(CacheError::StoreUnavailable("connection refused".into()))
        }
        async fn clear_type(&self, _: &str) -> Result<u64> {
            Err(CacheError::StoreUnavailable("connection refused".into()))
        }
        async fn clear_all(&self) -> Result<u64> {
            Err(CacheError::StoreUnavailable("connection refused".into()))
        }
        async fn stats(&self, _: Option<&str>) -> Result<Vec<TypeStats>> {
            Err(CacheError::StoreUnavailable("connection refused".into()))
        }
        async fn purge_expired(&self) -> Result<u64> {
            Err(CacheError::StoreUnavailable("connection refused".into()))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let cache = memory_cache();
        let args = CallArgs::new().arg("Tokyo, Japan");
        let payload = json!({"lat": 35.6762, "lng": 139.6503});

        cache.set("google_geocoding", &payload, &args).await;
        let cached = cache.get("google_geocoding", &args).await;

        assert_eq!(cached, Some(payload));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let cache = memory_cache();
        let args = CallArgs::new().arg("Nowhere");

        assert!(cache.get("google_geocoding", &args).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = memory_cache();
        let args = CallArgs::new().arg("Tokyo, Japan");
        let cache_key = derive_key("google_geocoding", &args).unwrap();

        // Write an already-expired document directly through the store.
        let mut entry = CacheEntry::new(
            "google_geocoding",
            &cache_key,
            json!({"lat": 35.6762}),
            Duration::days(30),
        );
        entry.expires_at = Utc::now() - Duration::seconds(1);
        cache.store().upsert(&entry).await.unwrap();

        assert!(cache.get("google_geocoding", &args).await.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_same_key() {
        let cache = memory_cache();
        let args = CallArgs::new().arg("Tokyo, Japan");

        cache.set("google_geocoding", &json!({"v": 1}), &args).await;
        cache.set("google_geocoding", &json!({"v": 2}), &args).await;

        assert_eq!(cache.get("google_geocoding", &args).await, Some(json!({"v": 2})));
        let stats = cache.stats(Some("google_geocoding")).await.unwrap();
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_fail_open_get_returns_none() {
        let cache = Cache::new(Arc::new(FailingStore));
        let args = CallArgs::new().arg("Tokyo, Japan");

        assert!(cache.get("google_geocoding", &args).await.is_none());
    }

    #[tokio::test]
    async fn test_fail_open_set_does_not_panic_or_propagate() {
        let cache = Cache::new(Arc::new(FailingStore));
        let args = CallArgs::new().arg("Tokyo, Japan");

        // Must complete silently despite the store being down.
        cache.set("google_geocoding", &json!({"lat": 1.0}), &args).await;
        assert!(!cache.delete("google_geocoding", &args).await);
    }

    #[tokio::test]
    async fn test_key_derivation_failure_is_miss() {
        let cache = memory_cache();
        let bad_args = CallArgs::new().arg(f64::NAN);

        assert!(cache.get("google_geocoding", &bad_args).await.is_none());
        cache.set("google_geocoding", &json!({"v": 1}), &bad_args).await;

        // Nothing was written under any key.
        let stats = cache.stats(None).await.unwrap();
        assert_eq!(stats.total_entries, 0);
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let cache = memory_cache();
        let args = CallArgs::new().arg("id-42");

        cache.set("google_place_details", &json!({"name": "x"}), &args).await;
        assert!(cache.delete("google_place_details", &args).await);
        assert!(cache.get("google_place_details", &args).await.is_none());
    }

    #[tokio::test]
    async fn test_scoped_clear_leaves_other_types() {
        let cache = memory_cache();
        let args = CallArgs::new().arg("q");

        cache.set("google_geocoding", &json!({"a": 1}), &args).await;
        cache.set("yelp_business_search", &json!({"b": 2}), &args).await;

        let removed = cache.clear(Some("google_geocoding")).await.unwrap();
        assert_eq!(removed, 1);

        assert!(cache.get("google_geocoding", &args).await.is_none());
        let stats = cache.stats(Some("yelp_business_search")).await.unwrap();
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_stats_counts_hits_and_misses() {
        let cache = memory_cache();
        let args = CallArgs::new().arg("Tokyo, Japan");

        let _ = cache.get("google_geocoding", &args).await; // miss
        cache.set("google_geocoding", &json!({"lat": 1.0}), &args).await;
        let _ = cache.get("google_geocoding", &args).await; // hit

        let stats = cache.stats(None).await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
