//! Cache generation lifecycle
//!
//! Moves the resource region from "matches the previous manifest" to
//! "matches the current manifest" in two steps:
//!
//! | Step | Touches | Effect |
//! |------|---------|--------|
//! | install | staging | shell files fetched with a reload directive and staged |
//! | activate | all three | stale entries evicted, staging merged, manifest persisted |
//!
//! Entries whose fingerprint did not change between generations are kept,
//! so unchanged assets are never downloaded twice. If anything goes wrong
//! during activation the cache can no longer be trusted and every region
//! is deleted.

use crate::artifact::Artifact;
use crate::context::WorkerContext;
use crate::error::{OffgridError, OffgridResult};
use crate::fetch::{fetch_ok, FetchRequest};
use crate::manifest_store::ManifestStore;
use crate::storage::copy_all;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info};

/// Result of an activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// No previous manifest: the resource region was rebuilt from staging
    Fresh { copied: usize },
    /// Previous generation diffed against the current manifest
    Upgraded {
        evicted: usize,
        retained: usize,
        copied: usize,
    },
    /// Activation failed and every region was deleted
    Reset { reason: String },
}

impl Activation {
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh { copied } => write!(f, "fresh install, {} shell files cached", copied),
            Self::Upgraded {
                evicted,
                retained,
                copied,
            } => write!(
                f,
                "upgraded: {} evicted, {} retained, {} shell files refreshed",
                evicted, retained, copied
            ),
            Self::Reset { reason } => write!(f, "cache reset after failure: {}", reason),
        }
    }
}

/// Drives install and activate
pub struct LifecycleController {
    ctx: WorkerContext,
}

impl LifecycleController {
    pub fn new(ctx: WorkerContext) -> Self {
        Self { ctx }
    }

    /// Stage the shell files of this generation
    ///
    /// All shell files are fetched before anything is written, so a failed
    /// install never leaves a partial staging region behind it. Returns the
    /// number of files staged.
    pub async fn install(&self) -> OffgridResult<usize> {
        let ctx = &self.ctx;
        ctx.host.skip_waiting().await;

        let staging = ctx.storage.open(&ctx.regions.staging).await?;

        let total = ctx.deployment.shell.len();
        ctx.progress.on_batch_start(total);
        let done = AtomicUsize::new(0);
        let done = &done;

        let fetched: Vec<(String, Artifact)> =
            stream::iter(ctx.deployment.shell.iter())
                .map(|key| async move {
                    let url = ctx.origin.url_for(key);
                    match fetch_ok(&*ctx.fetcher, &FetchRequest::reload(url.as_str())).await {
                        Ok(artifact) => {
                            let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                            ctx.progress.on_fetched(key, n, total);
                            Ok((url, artifact))
                        }
                        Err(e) => Err(OffgridError::ShellFetch {
                            key: key.clone(),
                            source: Box::new(e),
                        }),
                    }
                })
                .buffer_unordered(ctx.concurrency.max(1))
                .try_collect()
                .await?;

        let staged = fetched.len();
        for (url, artifact) in fetched {
            staging.put(&url, artifact).await?;
        }

        info!("Staged {} shell files", staged);
        Ok(staged)
    }

    /// Commit this generation
    ///
    /// Failures are contained: the regions are torn down and the outcome is
    /// [`Activation::Reset`]. Only a failure of the teardown itself is
    /// returned as an error.
    pub async fn activate(&self) -> OffgridResult<Activation> {
        match self.commit().await {
            Ok(activation) => {
                self.ctx.host.claim_clients().await;
                info!("Activated: {}", activation);
                Ok(activation)
            }
            Err(e) => {
                error!("Failed to upgrade worker cache: {}", e);
                self.teardown().await?;
                Ok(Activation::Reset {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn commit(&self) -> OffgridResult<Activation> {
        let ctx = &self.ctx;
        let regions = &ctx.regions;

        let mut resources = ctx.storage.open(&regions.resources).await?;
        let staging = ctx.storage.open(&regions.staging).await?;
        let store = ManifestStore::new(ctx.storage.open(&regions.manifest).await?);

        let Some(previous) = store.load().await? else {
            // No record of what the resource region holds: start clean
            ctx.storage.delete(&regions.resources).await?;
            resources = ctx.storage.open(&regions.resources).await?;

            let copied = copy_all(&*staging, &*resources).await?;
            ctx.storage.delete(&regions.staging).await?;
            store.save(&ctx.deployment.resources).await?;

            return Ok(Activation::Fresh { copied });
        };

        let mut evicted = 0;
        let mut retained = 0;
        for url in resources.keys().await? {
            let keep = ctx
                .origin
                .entry_key(&url)
                .is_some_and(|key| ctx.deployment.resources.retains(&previous.resources, &key));

            if keep {
                retained += 1;
            } else {
                debug!("Evicting {}", url);
                resources.delete(&url).await?;
                evicted += 1;
            }
        }

        // Shell files are always refreshed, even when retained above
        let copied = copy_all(&*staging, &*resources).await?;
        ctx.storage.delete(&regions.staging).await?;
        store.save(&ctx.deployment.resources).await?;

        Ok(Activation::Upgraded {
            evicted,
            retained,
            copied,
        })
    }

    /// Delete every region, returning to the never-installed state
    ///
    /// Attempts all deletions and reports the first failure.
    pub async fn teardown(&self) -> OffgridResult<()> {
        let mut first_err = None;
        for name in self.ctx.regions.all() {
            if let Err(e) = self.ctx.storage.delete(name).await {
                error!("Failed to delete region {}: {}", name, e);
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
