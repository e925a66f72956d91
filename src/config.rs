//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Cache subsystem configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults, except the store URL which has no default: its absence is
/// surfaced as a `StoreUnavailable` error when the store is first built,
/// never at module load time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection URI for the persistent store (e.g. "redis://127.0.0.1:6379/")
    pub store_url: Option<String>,
    /// Key namespace prefix isolating this deployment's entries
    pub namespace: String,
    /// HTTP port for the admin server
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Maximum number of pooled store connections
    pub store_pool_size: usize,
    /// Per-call store timeout in milliseconds
    pub store_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Read once at process start; the cache never re-reads the environment.
    ///
    /// # Environment Variables
    /// - `CACHE_STORE_URL` - Store connection URI (no default)
    /// - `CACHE_NAMESPACE` - Key namespace prefix (default: "place_cache")
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `STORE_POOL_SIZE` - Connection pool size (default: 16)
    /// - `STORE_TIMEOUT_MS` - Store call timeout (default: 5000)
    pub fn from_env() -> Self {
        Self {
            store_url: env::var("CACHE_STORE_URL").ok().filter(|v| !v.is_empty()),
            namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "place_cache".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            store_pool_size: env::var("STORE_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(16),
            store_timeout_ms: env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            namespace: "place_cache".to_string(),
            server_port: 3000,
            cleanup_interval: 60,
            store_pool_size: 16,
            store_timeout_ms: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.store_url.is_none());
        assert_eq!(config.namespace, "place_cache");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.store_pool_size, 16);
        assert_eq!(config.store_timeout_ms, 5000);
    }
}
