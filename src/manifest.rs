//! Resource manifests
//!
//! A [`ResourceManifest`] maps origin-relative resource keys to content
//! fingerprints. The build produces one per deployment, together with the
//! list of shell keys that must be staged before the worker activates;
//! both travel in a [`Deployment`] file.

use crate::error::{OffgridError, OffgridResult};
use crate::origin::ROOT_KEY;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Mapping from resource key to content fingerprint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManifest(BTreeMap<String, String>);

impl ResourceManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint recorded for a key
    pub fn fingerprint(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a cached copy of `key` made under `previous` is still valid here
    ///
    /// Keys dropped from this manifest, or whose fingerprint moved, are stale.
    pub fn retains(&self, previous: &ResourceManifest, key: &str) -> bool {
        match (self.fingerprint(key), previous.fingerprint(key)) {
            (Some(current), Some(old)) => current == old,
            _ => false,
        }
    }

    /// Keys of `previous` that are no longer valid under this manifest
    pub fn stale_keys<'a>(&self, previous: &'a ResourceManifest) -> Vec<&'a str> {
        previous
            .keys()
            .filter(|key| !self.retains(previous, key))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceManifest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build-time input baked in per deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployment {
    /// Desired end state of the resource cache
    pub resources: ResourceManifest,

    /// Keys staged on install, before the previous generation is touched
    #[serde(default)]
    pub shell: Vec<String>,
}

impl Deployment {
    /// Create a deployment, validating that the shell is covered by the manifest
    pub fn new(resources: ResourceManifest, shell: Vec<String>) -> Result<Self, String> {
        let deployment = Self { resources, shell };
        deployment.validate()?;
        Ok(deployment)
    }

    /// Load and validate a deployment file
    pub async fn load(path: &Path) -> OffgridResult<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            OffgridError::io(format!("reading deployment from {}", path.display()), e)
        })?;

        let deployment: Deployment =
            serde_json::from_str(&content).map_err(|e| OffgridError::DeploymentInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        deployment
            .validate()
            .map_err(|reason| OffgridError::DeploymentInvalid {
                path: path.to_path_buf(),
                reason,
            })?;

        debug!(
            "Loaded deployment with {} resources, {} shell files",
            deployment.resources.len(),
            deployment.shell.len()
        );
        Ok(deployment)
    }

    fn validate(&self) -> Result<(), String> {
        for key in self.resources.keys() {
            if key != ROOT_KEY && key.starts_with('/') {
                return Err(format!("resource key must be origin-relative: {}", key));
            }
        }
        for key in &self.shell {
            if !self.resources.contains(key) {
                return Err(format!("shell file not listed in resources: {}", key));
            }
        }
        Ok(())
    }
}

/// Snapshot of the manifest that was active after the last successful activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedManifest {
    pub resources: ResourceManifest,
    pub activated_at: Option<DateTime<Utc>>,
}

impl PersistedManifest {
    /// Snapshot a manifest as of now
    pub fn now(resources: ResourceManifest) -> Self {
        Self {
            resources,
            activated_at: Some(Utc::now()),
        }
    }

    pub fn to_json(&self) -> OffgridResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a record body
    ///
    /// Accepts the current `{"resources": .., "activated_at": ..}` shape and
    /// the bare `{"key": "fingerprint"}` map written by older workers.
    pub fn from_json(bytes: &[u8]) -> OffgridResult<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Record {
            Current {
                resources: ResourceManifest,
                activated_at: Option<DateTime<Utc>>,
            },
            Bare(ResourceManifest),
        }

        match serde_json::from_slice::<Record>(bytes) {
            Ok(Record::Current {
                resources,
                activated_at,
            }) => Ok(Self {
                resources,
                activated_at,
            }),
            Ok(Record::Bare(resources)) => Ok(Self {
                resources,
                activated_at: None,
            }),
            Err(e) => Err(OffgridError::ManifestCorrupt(e.to_string())),
        }
    }
}
