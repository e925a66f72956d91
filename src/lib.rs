//! Place Cache - A persistent response cache for place-search APIs
//!
//! Caches responses from rate-limited, pay-per-call place-search APIs
//! (geocoding, nearby/business search, details, reviews) keyed by
//! normalized call parameters, with category-specific TTL policies,
//! automatic expiry, and fail-open semantics: a cache outage degrades to
//! uncached latency, never to a caller-visible failure.

pub mod api;
pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod intercept;
pub mod key;
pub mod models;
pub mod policy;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{BlockingCache, Cache, CacheEntry, CacheStats, TypeStats};
pub use clients::{install_caching, CachedClient, PlaceClient};
pub use config::Config;
pub use error::{CacheError, Result};
pub use intercept::{cached_fetch, cached_fetch_blocking};
pub use key::{derive_key, CallArgs};
pub use store::{MemoryStore, RedisStore, Store};
pub use tasks::spawn_purge_task;
