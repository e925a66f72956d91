//! Blocking Cache Surface
//!
//! Thread-blocking twin of the async facade for callers that are not
//! running on the async scheduler. Each call drives the corresponding
//! facade future to completion on a private current-thread runtime, so the
//! calling thread blocks for exactly the duration of the store round-trip.
//!
//! Must not be used from inside an async context: `block_on` would panic
//! there, and such callers should hold the async [`Cache`] instead.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::cache::{Cache, CacheStats};
use crate::error::{CacheError, Result};
use crate::key::CallArgs;

// == Blocking Cache ==
/// Blocking view over a shared [`Cache`].
///
/// Semantics are identical to the async surface, including fail-open
/// behavior on `get`/`set`/`delete`.
pub struct BlockingCache {
    inner: Arc<Cache>,
    runtime: Runtime,
}

impl BlockingCache {
    // == Constructor ==
    /// Wraps a shared facade with a private single-threaded runtime.
    pub fn new(inner: Arc<Cache>) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CacheError::Internal(e.to_string()))?;
        Ok(Self { inner, runtime })
    }

    /// The shared async facade this surface delegates to.
    pub fn inner(&self) -> &Arc<Cache> {
        &self.inner
    }

    // == Operations ==
    /// Blocking equivalent of [`Cache::get`].
    pub fn get(&self, cache_type: &str, args: &CallArgs) -> Option<Value> {
        self.runtime.block_on(self.inner.get(cache_type, args))
    }

    /// Blocking equivalent of [`Cache::set`].
    pub fn set(&self, cache_type: &str, payload: &impl Serialize, args: &CallArgs) {
        self.runtime.block_on(self.inner.set(cache_type, payload, args))
    }

    /// Blocking equivalent of [`Cache::delete`].
    pub fn delete(&self, cache_type: &str, args: &CallArgs) -> bool {
        self.runtime.block_on(self.inner.delete(cache_type, args))
    }

    /// Blocking equivalent of [`Cache::clear`].
    pub fn clear(&self, cache_type: Option<&str>) -> Result<u64> {
        self.runtime.block_on(self.inner.clear(cache_type))
    }

    /// Blocking equivalent of [`Cache::stats`].
    pub fn stats(&self, cache_type: Option<&str>) -> Result<CacheStats> {
        self.runtime.block_on(self.inner.stats(cache_type))
    }
}
