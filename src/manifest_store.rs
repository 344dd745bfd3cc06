//! Access to the persisted manifest record

use crate::artifact::Artifact;
use crate::error::OffgridResult;
use crate::manifest::{PersistedManifest, ResourceManifest};
use crate::storage::CacheRegion;
use std::sync::Arc;
use tracing::debug;

/// Key of the single record inside the manifest region
pub const MANIFEST_KEY: &str = "manifest";

/// Reads and writes the last activated manifest
pub struct ManifestStore {
    region: Arc<dyn CacheRegion>,
}

impl ManifestStore {
    pub fn new(region: Arc<dyn CacheRegion>) -> Self {
        Self { region }
    }

    /// The record written by the last successful activation, if any
    pub async fn load(&self) -> OffgridResult<Option<PersistedManifest>> {
        match self.region.get(MANIFEST_KEY).await? {
            Some(artifact) => PersistedManifest::from_json(&artifact.body).map(Some),
            None => Ok(None),
        }
    }

    /// Replace the record with a snapshot of `resources`
    pub async fn save(&self, resources: &ResourceManifest) -> OffgridResult<()> {
        let record = PersistedManifest::now(resources.clone());
        let artifact =
            Artifact::ok(record.to_json()?).header("Content-Type", "application/json");
        self.region.put(MANIFEST_KEY, artifact).await?;
        debug!("Persisted manifest with {} resources", resources.len());
        Ok(())
    }
}
