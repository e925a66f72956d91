//! Store Adapter Module
//!
//! Persistence seam for cache documents. Two backends implement the same
//! contract: a Redis-backed store for production and an in-process store
//! for tests and store-less fallback.
//!
//! Every method is a suspension point; key derivation and TTL lookup never
//! touch the store. Implementations must be safe for concurrent use by
//! arbitrarily many callers without external locking, and a failed write
//! must never leave a partially-written document behind.

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;

use crate::cache::{CacheEntry, TypeStats};
use crate::error::Result;

// == Store Trait ==
/// Persistence contract for cache documents.
///
/// All failures surface as `CacheError::StoreUnavailable`; the facade maps
/// them to misses (reads) or logged no-ops (writes).
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetches a live entry. Entries past `expires_at` are never returned,
    /// even if a background sweep has not reclaimed them yet.
    async fn get(&self, cache_type: &str, cache_key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts or overwrites the entry with the same `cache_key`. Idempotent.
    async fn upsert(&self, entry: &CacheEntry) -> Result<()>;

    /// Removes one entry. Returns whether anything was removed.
    async fn delete(&self, cache_type: &str, cache_key: &str) -> Result<bool>;

    /// Removes every entry in one cache-type partition.
    async fn clear_type(&self, cache_type: &str) -> Result<u64>;

    /// Removes every entry across all partitions.
    async fn clear_all(&self) -> Result<u64>;

    /// Reports entry counts and approximate sizes, for one type or all.
    async fn stats(&self, cache_type: Option<&str>) -> Result<Vec<TypeStats>>;

    /// Reclaims entries past `expires_at`. Returns the number removed.
    /// Backends whose engine expires natively may report zero.
    async fn purge_expired(&self) -> Result<u64>;

    /// Backend name for logs and health output.
    fn name(&self) -> &'static str;
}
