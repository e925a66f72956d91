//! Client Caching Module
//!
//! Applies the interception layer to the known external place-API client
//! methods at process startup. The clients themselves (HTTP calls, auth,
//! retries) are opaque collaborators behind the [`PlaceClient`] boundary;
//! this module only rebinds their methods to cache-wrapped equivalents
//! without altering any call contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::cache::Cache;
use crate::intercept::cached_fetch;
use crate::key::CallArgs;

// == Method Cache Types ==
/// Fixed method-to-cache-type bindings applied by [`CachedClient`].
pub const GEOCODE_CACHE_TYPE: &str = "google_geocoding";
pub const SEARCH_NEARBY_CACHE_TYPE: &str = "google_places_nearby";
pub const PLACE_DETAILS_CACHE_TYPE: &str = "google_place_details";
pub const PLACE_REVIEWS_CACHE_TYPE: &str = "yelp_business_reviews";

// == Place Client Boundary ==
/// Call surface of the external place-search clients.
///
/// Each method takes plain arguments and returns a serializable response
/// or an error; the cache needs nothing else about the implementation.
#[async_trait]
pub trait PlaceClient: Send + Sync {
    /// Resolves a free-form address to coordinates.
    async fn geocode(&self, address: &str) -> anyhow::Result<Value>;

    /// Searches for places around a location.
    async fn search_nearby(
        &self,
        location: &str,
        radius_m: u32,
        category: Option<&str>,
    ) -> anyhow::Result<Value>;

    /// Fetches details for one place.
    async fn place_details(&self, place_id: &str) -> anyhow::Result<Value>;

    /// Fetches reviews for one place.
    async fn place_reviews(&self, place_id: &str) -> anyhow::Result<Value>;

    /// Marker used by [`install_caching`] to avoid double-wrapping.
    fn is_cached(&self) -> bool {
        false
    }
}

// == Cached Client ==
/// A [`PlaceClient`] whose every method is routed through the cache.
///
/// On hit the wrapped client is never called; on miss its result is cached
/// under the method's fixed cache type before being returned. Client errors
/// propagate unchanged.
pub struct CachedClient {
    inner: Arc<dyn PlaceClient>,
    cache: Arc<Cache>,
}

impl CachedClient {
    /// Wraps a client. Prefer [`install_caching`], which is idempotent.
    pub fn new(inner: Arc<dyn PlaceClient>, cache: Arc<Cache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl PlaceClient for CachedClient {
    async fn geocode(&self, address: &str) -> anyhow::Result<Value> {
        let args = CallArgs::new().arg(address);
        cached_fetch(&self.cache, GEOCODE_CACHE_TYPE, &args, || {
            self.inner.geocode(address)
        })
        .await
    }

    async fn search_nearby(
        &self,
        location: &str,
        radius_m: u32,
        category: Option<&str>,
    ) -> anyhow::Result<Value> {
        let args = CallArgs::new()
            .arg(location)
            .arg(radius_m)
            .kwarg("category", category);
        cached_fetch(&self.cache, SEARCH_NEARBY_CACHE_TYPE, &args, || {
            self.inner.search_nearby(location, radius_m, category)
        })
        .await
    }

    async fn place_details(&self, place_id: &str) -> anyhow::Result<Value> {
        let args = CallArgs::new().arg(place_id);
        cached_fetch(&self.cache, PLACE_DETAILS_CACHE_TYPE, &args, || {
            self.inner.place_details(place_id)
        })
        .await
    }

    async fn place_reviews(&self, place_id: &str) -> anyhow::Result<Value> {
        let args = CallArgs::new().arg(place_id);
        cached_fetch(&self.cache, PLACE_REVIEWS_CACHE_TYPE, &args, || {
            self.inner.place_reviews(place_id)
        })
        .await
    }

    fn is_cached(&self) -> bool {
        true
    }
}

// == Startup Rebinding ==
/// Rebinds a client to its cache-wrapped equivalent at startup.
///
/// Idempotent: a client that is already cache-wrapped is returned unchanged
/// with a logged skip. Operational convenience only; this never fails and
/// never aborts startup.
pub fn install_caching(client: Arc<dyn PlaceClient>, cache: Arc<Cache>) -> Arc<dyn PlaceClient> {
    if client.is_cached() {
        info!("client already cache-wrapped, skipping");
        return client;
    }
    info!("installing response cache on place client");
    Arc::new(CachedClient::new(client, cache))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use anyhow::anyhow;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Client double counting how often each method body executes.
    #[derive(Default)]
    struct CountingClient {
        geocode_calls: AtomicUsize,
        reviews_calls: AtomicUsize,
        fail_reviews: bool,
    }

    #[async_trait]
    impl PlaceClient for CountingClient {
        async fn geocode(&self, address: &str) -> anyhow::Result<Value> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"address": address, "lat": 35.6762, "lng": 139.6503}))
        }

        async fn search_nearby(
            &self,
            location: &str,
            radius_m: u32,
            _category: Option<&str>,
        ) -> anyhow::Result<Value> {
            Ok(json!({"location": location, "radius": radius_m}))
        }

        async fn place_details(&self, place_id: &str) -> anyhow::Result<Value> {
            Ok(json!({"place_id": place_id}))
        }

        async fn place_reviews(&self, place_id: &str) -> anyhow::Result<Value> {
            self.reviews_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_reviews {
                return Err(anyhow!("upstream rate limited"));
            }
            Ok(json!({"place_id": place_id, "reviews": []}))
        }

        fn is_cached(&self) -> bool {
            false
        }
    }

    fn cache() -> Arc<Cache> {
        Arc::new(Cache::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_wrapped_geocode_hits_cache_on_repeat() {
        let inner = Arc::new(CountingClient::default());
        let wrapped = install_caching(inner.clone(), cache());

        let first = wrapped.geocode("Tokyo, Japan").await.unwrap();
        let second = wrapped.geocode("Tokyo, Japan").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.geocode_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_addresses_are_distinct_entries() {
        let inner = Arc::new(CountingClient::default());
        let wrapped = install_caching(inner.clone(), cache());

        wrapped.geocode("Tokyo, Japan").await.unwrap();
        wrapped.geocode("Kyoto, Japan").await.unwrap();

        assert_eq!(inner.geocode_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_install_caching_is_idempotent() {
        let inner: Arc<dyn PlaceClient> = Arc::new(CountingClient::default());
        let cache = cache();

        let once = install_caching(inner, Arc::clone(&cache));
        assert!(once.is_cached());

        let twice = install_caching(Arc::clone(&once), cache);
        assert!(Arc::ptr_eq(&once, &twice), "must not double-wrap");
    }

    #[tokio::test]
    async fn test_client_errors_propagate_unchanged() {
        let inner = Arc::new(CountingClient {
            fail_reviews: true,
            ..CountingClient::default()
        });
        let wrapped = install_caching(inner.clone(), cache());

        let err = wrapped.place_reviews("p1").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));

        // Failure was not cached; the method body runs again.
        let _ = wrapped.place_reviews("p1").await;
        assert_eq!(inner.reviews_calls.load(Ordering::SeqCst), 2);
    }
}
