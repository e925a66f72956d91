//! Interception Module
//!
//! Higher-order wrappers that put a cache check/store around an arbitrary
//! fetch without changing its contract: on hit the fetch never runs, on
//! miss its result is cached before being returned. Errors raised by the
//! fetch propagate unchanged; only cache-subsystem errors are swallowed.
//!
//! Concurrent misses on the same key are not deduplicated: racing callers
//! each fetch and each upsert, and the last completed write wins. Callers
//! sensitive to duplicate-fetch cost should add their own in-process
//! single-flight in front of the cache.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::cache::{BlockingCache, Cache};
use crate::key::CallArgs;

// == Async Wrapper ==
/// Runs `fetch` through the cache under `(cache_type, args)`.
///
/// On hit, returns the cached payload without executing `fetch`. A cached
/// payload that no longer deserializes into `T` is logged and treated as a
/// miss. On miss, `fetch` runs; a successful result is cached before being
/// returned, and an error is returned untouched.
pub async fn cached_fetch<T, E, F, Fut>(
    cache: &Cache,
    cache_type: &str,
    args: &CallArgs,
    fetch: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(payload) = cache.get(cache_type, args).await {
        match serde_json::from_value(payload) {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(cache_type, error = %e, "cached payload undecodable, refetching");
            }
        }
    }

    let result = fetch().await?;
    cache.set(cache_type, &result, args).await;
    Ok(result)
}

// == Blocking Wrapper ==
/// Thread-blocking variant of [`cached_fetch`] for synchronous callables.
pub fn cached_fetch_blocking<T, E, F>(
    cache: &BlockingCache,
    cache_type: &str,
    args: &CallArgs,
    fetch: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, E>,
{
    if let Some(payload) = cache.get(cache_type, args) {
        match serde_json::from_value(payload) {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(cache_type, error = %e, "cached payload undecodable, refetching");
            }
        }
    }

    let result = fetch()?;
    cache.set(cache_type, &result, args);
    Ok(result)
}
