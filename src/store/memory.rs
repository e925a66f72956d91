//! In-Process Store Backend
//!
//! HashMap-backed implementation of the store contract, partitioned by
//! cache type. Entries past their expiry are filtered on read and reclaimed
//! by the background sweep, mirroring the persistent backend's semantics so
//! tests exercise the same behavior callers see in production.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, TypeStats};
use crate::error::Result;
use crate::store::Store;

// == Memory Store ==
/// In-process store: one map of entries per cache-type partition.
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: RwLock<HashMap<String, HashMap<String, CacheEntry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, cache_type: &str, cache_key: &str) -> Result<Option<CacheEntry>> {
        let partitions = self.partitions.read().await;
        let entry = partitions
            .get(cache_type)
            .and_then(|partition| partition.get(cache_key));

        // Lazy expiry filter: logically-expired entries are absent even
        // before the sweep physically removes them.
        match entry {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.clone())),
            _ => Ok(None),
        }
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<()> {
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(entry.cache_type.clone())
            .or_default()
            .insert(entry.cache_key.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, cache_type: &str, cache_key: &str) -> Result<bool> {
        let mut partitions = self.partitions.write().await;
        Ok(partitions
            .get_mut(cache_type)
            .map(|partition| partition.remove(cache_key).is_some())
            .unwrap_or(false))
    }

    async fn clear_type(&self, cache_type: &str) -> Result<u64> {
        let mut partitions = self.partitions.write().await;
        Ok(partitions
            .remove(cache_type)
            .map(|partition| partition.len() as u64)
            .unwrap_or(0))
    }

    async fn clear_all(&self) -> Result<u64> {
        let mut partitions = self.partitions.write().await;
        let removed = partitions.values().map(|p| p.len() as u64).sum();
        partitions.clear();
        Ok(removed)
    }

    async fn stats(&self, cache_type: Option<&str>) -> Result<Vec<TypeStats>> {
        let partitions = self.partitions.read().await;

        let stats = partitions
            .iter()
            .filter(|(name, _)| cache_type.map(|t| t == name.as_str()).unwrap_or(true))
            .map(|(name, partition)| {
                let live: Vec<&CacheEntry> =
                    partition.values().filter(|e| !e.is_expired()).collect();
                TypeStats {
                    cache_type: name.clone(),
                    entries: live.len() as u64,
                    approx_bytes: live.iter().map(|e| e.approx_size_bytes()).sum(),
                }
            })
            .collect();

        Ok(stats)
    }

    async fn purge_expired(&self) -> Result<u64> {
        let mut partitions = self.partitions.write().await;
        let mut removed = 0u64;

        for partition in partitions.values_mut() {
            let before = partition.len();
            partition.retain(|_, entry| !entry.is_expired());
            removed += (before - partition.len()) as u64;
        }
        partitions.retain(|_, partition| !partition.is_empty());

        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
