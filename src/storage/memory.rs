//! In-memory storage backend

use super::{CacheRegion, Storage};
use crate::artifact::Artifact;
use crate::error::OffgridResult;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Region held in memory
///
/// A handle stays usable after its region is deleted from the storage,
/// but writes through it are no longer visible to new `open` calls.
#[derive(Debug, Default)]
pub struct MemoryRegion {
    entries: RwLock<BTreeMap<String, Artifact>>,
}

#[async_trait]
impl CacheRegion for MemoryRegion {
    async fn get(&self, key: &str) -> OffgridResult<Option<Artifact>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, artifact: Artifact) -> OffgridResult<()> {
        self.entries.write().await.insert(key.to_string(), artifact);
        Ok(())
    }

    async fn delete(&self, key: &str) -> OffgridResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> OffgridResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// Storage backend that lives for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    regions: Arc<RwLock<HashMap<String, Arc<MemoryRegion>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn open(&self, name: &str) -> OffgridResult<Arc<dyn CacheRegion>> {
        let mut regions = self.regions.write().await;
        let region: Arc<dyn CacheRegion> = regions.entry(name.to_string()).or_default().clone();
        Ok(region)
    }

    async fn delete(&self, name: &str) -> OffgridResult<bool> {
        Ok(self.regions.write().await.remove(name).is_some())
    }

    async fn has(&self, name: &str) -> OffgridResult<bool> {
        Ok(self.regions.read().await.contains_key(name))
    }

    async fn names(&self) -> OffgridResult<Vec<String>> {
        let mut names: Vec<String> = self.regions.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
