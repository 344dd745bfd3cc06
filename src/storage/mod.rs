//! Named, persisted cache regions
//!
//! The worker keeps three regions: a transient staging region for the next
//! generation's shell files, the resource region that serves traffic, and
//! the manifest region holding the last activated manifest. Regions are
//! keyed by request URL.
//!
//! # Backends
//!
//! | Backend | Durability | Use |
//! |---------|------------|-----|
//! | [`MemoryStorage`] | process lifetime | tests, embedding |
//! | [`DiskStorage`] | survives restarts | the `offgrid` CLI |

mod disk;
mod memory;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;

use crate::artifact::Artifact;
use crate::config::StorageConfig;
use crate::error::OffgridResult;
use async_trait::async_trait;
use std::sync::Arc;

/// A single named key-to-artifact store
#[async_trait]
pub trait CacheRegion: Send + Sync {
    /// Look up an entry
    async fn get(&self, key: &str) -> OffgridResult<Option<Artifact>>;

    /// Insert or replace an entry
    async fn put(&self, key: &str, artifact: Artifact) -> OffgridResult<()>;

    /// Remove an entry, returning whether it existed
    async fn delete(&self, key: &str) -> OffgridResult<bool>;

    /// All keys currently stored
    async fn keys(&self) -> OffgridResult<Vec<String>>;
}

/// Registry of named regions scoped to one origin
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open a region, creating it if it does not exist
    async fn open(&self, name: &str) -> OffgridResult<Arc<dyn CacheRegion>>;

    /// Delete a region and everything in it, returning whether it existed
    async fn delete(&self, name: &str) -> OffgridResult<bool>;

    /// Whether a region exists
    async fn has(&self, name: &str) -> OffgridResult<bool>;

    /// Names of all existing regions
    async fn names(&self) -> OffgridResult<Vec<String>>;
}

/// The fixed region names used by one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regions {
    pub staging: String,
    pub resources: String,
    pub manifest: String,
}

impl Regions {
    /// All three names, in teardown order
    pub fn all(&self) -> [&str; 3] {
        [&self.resources, &self.staging, &self.manifest]
    }
}

impl Default for Regions {
    fn default() -> Self {
        Self {
            staging: "offgrid-temp-cache".to_string(),
            resources: "offgrid-app-cache".to_string(),
            manifest: "offgrid-app-manifest".to_string(),
        }
    }
}

impl From<&StorageConfig> for Regions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            staging: config.staging.clone(),
            resources: config.resources.clone(),
            manifest: config.manifest.clone(),
        }
    }
}

/// Copy every entry of `from` into `to`, overwriting existing keys
///
/// Returns the number of entries copied.
pub async fn copy_all(from: &dyn CacheRegion, to: &dyn CacheRegion) -> OffgridResult<usize> {
    let mut copied = 0;
    for key in from.keys().await? {
        if let Some(artifact) = from.get(&key).await? {
            to.put(&key, artifact).await?;
            copied += 1;
        }
    }
    Ok(copied)
}
