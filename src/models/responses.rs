//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, TypeStats};

/// Response body for the stats endpoints (GET /stats, GET /stats/:cache_type)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits observed by this process
    pub hits: u64,
    /// Number of cache misses observed by this process
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Total live entries across the reported types
    pub total_entries: u64,
    /// Total approximate size across the reported types, in bytes
    pub total_bytes: u64,
    /// Per-type storage breakdown
    pub types: Vec<TypeStats>,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            hits: stats.hits,
            misses: stats.misses,
            hit_rate,
            total_entries: stats.total_entries,
            total_bytes: stats.total_bytes,
            types: stats.types,
        }
    }
}

/// Response body for the clear endpoints (DELETE /cache, DELETE /cache/:cache_type)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Number of entries removed
    pub cleared: u64,
}

impl ClearResponse {
    /// Creates a new ClearResponse for a scoped or unconditional clear
    pub fn new(cache_type: Option<&str>, cleared: u64) -> Self {
        let message = match cache_type {
            Some(t) => format!("Cleared cache type '{}'", t),
            None => "Cleared all cache types".to_string(),
        };
        Self { message, cleared }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Store backend name
    pub backend: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(backend: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            backend: backend.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
