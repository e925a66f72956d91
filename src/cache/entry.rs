//! Cache Entry Module
//!
//! Defines the persisted document shape for cached API responses.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// One persisted document per cache key.
///
/// The payload is opaque to the cache: it is stored verbatim and never
/// inspected, validated, or transformed. Lookup is always by `cache_key`;
/// the optional description exists purely for human inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Deterministic hash of (cache_type, normalized args)
    pub cache_key: String,
    /// Logical API/endpoint family, selects the TTL policy and partition
    pub cache_type: String,
    /// The cached API response, stored verbatim
    pub payload: Value,
    /// Timestamp of the last write
    pub created_at: DateTime<Utc>,
    /// Timestamp after which the entry is considered absent
    pub expires_at: DateTime<Utc>,
    /// TTL applied at write time, in seconds
    pub ttl_secs: i64,
    /// Human-readable rendering of the original call arguments
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` after now.
    ///
    /// # Arguments
    /// * `cache_type` - Logical cache category
    /// * `cache_key` - Derived lookup key
    /// * `payload` - The response to cache
    /// * `ttl` - Time-to-live from the policy table
    pub fn new(cache_type: &str, cache_key: &str, payload: Value, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            cache_key: cache_key.to_string(),
            cache_type: cache_type.to_string(),
            payload,
            created_at: now,
            expires_at: now + ttl,
            ttl_secs: ttl.num_seconds(),
            description: None,
        }
    }

    /// Attaches a human-readable call description. Inspection only.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to `expires_at`, so an entry must never be
    /// served once its TTL has fully elapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL, clamped to zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let remaining = self.expires_at - Utc::now();
        if remaining > Duration::zero() {
            remaining
        } else {
            Duration::zero()
        }
    }

    /// Approximate persisted size in bytes (serialized JSON length).
    pub fn approx_size_bytes(&self) -> u64 {
        serde_json::to_string(self).map(|s| s.len() as u64).unwrap_or(0)
    }
}
