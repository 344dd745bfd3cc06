//! Directory-backed storage
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<region>/<sha256(key)>.json          key, status, headers, body file
//! <root>/<region>/<sha256(key)>.<id>.body     raw body bytes of one write
//! ```
//!
//! Every write gets a fresh body file. The metadata rename is the commit
//! point: until it lands, readers keep seeing the previous metadata and the
//! previous body together. The superseded body is removed afterwards.

use super::{CacheRegion, Storage};
use crate::artifact::Artifact;
use crate::error::{OffgridError, OffgridResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

const META_EXT: &str = "json";
const BODY_EXT: &str = "body";
const TMP_EXT: &str = "tmp";

#[derive(Serialize, Deserialize)]
struct EntryMeta {
    key: String,
    /// File name of the body written together with this metadata
    body_file: String,
    #[serde(flatten)]
    artifact: Artifact,
}

/// Region stored as one directory
#[derive(Debug, Clone)]
pub struct DiskRegion {
    name: String,
    dir: PathBuf,
}

impl DiskRegion {
    fn entry_stem(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::entry_stem(key), META_EXT))
    }

    /// A body file name no other write of `key` has used
    fn fresh_body_file(key: &str) -> String {
        format!(
            "{}.{}.{}",
            Self::entry_stem(key),
            Uuid::new_v4().simple(),
            BODY_EXT
        )
    }

    fn err(&self, context: &str, e: impl ToString) -> OffgridError {
        OffgridError::storage(&self.name, format!("{}: {}", context, e.to_string()))
    }

    async fn read_meta(&self, path: &Path) -> OffgridResult<Option<EntryMeta>> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| self.err(&format!("decoding {}", path.display()), e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.err(&format!("reading {}", path.display()), e)),
        }
    }

    /// Write `bytes` to `path` through a sibling tmp file
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> OffgridResult<()> {
        let tmp = path.with_extension(format!(
            "{}.{}",
            path.extension().and_then(|e| e.to_str()).unwrap_or_default(),
            TMP_EXT
        ));
        fs::write(&tmp, bytes)
            .await
            .map_err(|e| self.err(&format!("writing {}", tmp.display()), e))?;

        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(self.err(&format!("committing {}", path.display()), e));
        }
        Ok(())
    }

    async fn remove_body(&self, body_file: &str) {
        match fs::remove_file(self.dir.join(body_file)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {} in {}: {}", body_file, self.name, e),
        }
    }
}

#[async_trait]
impl CacheRegion for DiskRegion {
    async fn get(&self, key: &str) -> OffgridResult<Option<Artifact>> {
        let Some(meta) = self.read_meta(&self.meta_path(key)).await? else {
            return Ok(None);
        };

        let body_path = self.dir.join(&meta.body_file);
        let body = match fs::read(&body_path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Entry {} in {} has no body, treating as missing", key, self.name);
                return Ok(None);
            }
            Err(e) => return Err(self.err(&format!("reading {}", body_path.display()), e)),
        };

        Ok(Some(Artifact {
            body,
            ..meta.artifact
        }))
    }

    async fn put(&self, key: &str, artifact: Artifact) -> OffgridResult<()> {
        let meta_path = self.meta_path(key);
        let previous = self
            .read_meta(&meta_path)
            .await
            .ok()
            .flatten()
            .map(|meta| meta.body_file);

        let body_file = Self::fresh_body_file(key);
        self.write_atomic(&self.dir.join(&body_file), &artifact.body)
            .await?;

        let meta = EntryMeta {
            key: key.to_string(),
            body_file: body_file.clone(),
            artifact,
        };
        let committed = match serde_json::to_vec(&meta) {
            Ok(content) => self.write_atomic(&meta_path, &content).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = committed {
            self.remove_body(&body_file).await;
            return Err(e);
        }

        if let Some(old) = previous {
            self.remove_body(&old).await;
        }

        debug!("Stored {} in {}", key, self.name);
        Ok(())
    }

    async fn delete(&self, key: &str) -> OffgridResult<bool> {
        let meta_path = self.meta_path(key);
        let Some(meta) = self.read_meta(&meta_path).await? else {
            return Ok(false);
        };

        match fs::remove_file(&meta_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(self.err("removing entry metadata", e)),
        }
        self.remove_body(&meta.body_file).await;

        Ok(true)
    }

    async fn keys(&self) -> OffgridResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| self.err("listing region", e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.err("listing region", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == META_EXT) {
                if let Some(meta) = self.read_meta(&path).await? {
                    keys.push(meta.key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Storage backend rooted at a directory, one subdirectory per region
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn region_dir(&self, name: &str) -> OffgridResult<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
        {
            return Err(OffgridError::storage(name, "invalid region name"));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl Storage for DiskStorage {
    async fn open(&self, name: &str) -> OffgridResult<Arc<dyn CacheRegion>> {
        let dir = self.region_dir(name)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| OffgridError::io(format!("creating region {}", dir.display()), e))?;

        Ok(Arc::new(DiskRegion {
            name: name.to_string(),
            dir,
        }))
    }

    async fn delete(&self, name: &str) -> OffgridResult<bool> {
        let dir = self.region_dir(name)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!("Deleted region {}", name);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(OffgridError::io(
                format!("deleting region {}", dir.display()),
                e,
            )),
        }
    }

    async fn has(&self, name: &str) -> OffgridResult<bool> {
        let dir = self.region_dir(name)?;
        Ok(fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()))
    }

    async fn names(&self) -> OffgridResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(OffgridError::io(
                    format!("listing storage root {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| OffgridError::io("reading storage entry", e))?
        {
            let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
            if is_dir {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
