//! TTL Policy Module
//!
//! Static mapping from cache type to time-to-live. The table is read-only
//! at runtime; expiry times are always derived from it at write time and
//! never supplied per call.

use chrono::Duration;

// == TTL Tiers ==
/// Geocoding-class results: addresses and coordinates are very stable.
pub const TTL_LONG_DAYS: i64 = 30;

/// Search and details-class results: business data drifts slowly.
pub const TTL_MEDIUM_DAYS: i64 = 7;

/// Review and tip-class results: user content changes frequently.
pub const TTL_SHORT_DAYS: i64 = 3;

/// LLM destination analysis: destination characteristics rarely change.
pub const TTL_ANALYSIS_DAYS: i64 = 90;

// == TTL Lookup ==
/// Returns the TTL for a cache type.
///
/// Unrecognized types fall back to the short tier: when the policy for a
/// type is unknown, shorter staleness beats indefinite retention.
pub fn ttl_for(cache_type: &str) -> Duration {
    let days = match cache_type {
        "google_geocoding" => TTL_LONG_DAYS,

        "google_places_search"
        | "google_places_nearby"
        | "google_place_details"
        | "yelp_business_search"
        | "yelp_business_details"
        | "foursquare_venue_search"
        | "foursquare_venue_details"
        | "foursquare_places_match" => TTL_MEDIUM_DAYS,

        "yelp_business_reviews" | "foursquare_venue_tips" => TTL_SHORT_DAYS,

        "destination_radius" => TTL_ANALYSIS_DAYS,

        _ => TTL_SHORT_DAYS,
    };
    Duration::days(days)
}

// == Known Cache Types ==
/// All cache types with an explicit policy entry, for operator tooling
/// that wants to enumerate the known partitions.
pub fn known_cache_types() -> &'static [&'static str] {
    &[
        "google_places_search",
        "google_places_nearby",
        "google_geocoding",
        "google_place_details",
        "yelp_business_search",
        "yelp_business_details",
        "yelp_business_reviews",
        "foursquare_venue_search",
        "foursquare_venue_details",
        "foursquare_venue_tips",
        "foursquare_places_match",
        "destination_radius",
    ]
}
