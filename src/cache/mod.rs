//! Cache Module
//!
//! The cache facade and its supporting types: the persisted entry shape,
//! statistics, and the async and blocking call surfaces.

mod blocking;
mod entry;
mod facade;
mod stats;


// Re-export public types
pub use blocking::BlockingCache;
pub use entry::CacheEntry;
pub use facade::Cache;
pub use stats::{CacheStats, TypeStats};
