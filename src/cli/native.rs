//! Runs the worker on the local machine
//!
//! Regions live on disk under the configured storage root and fetches go
//! straight to the configured origin. There are no pages to claim, so host
//! signals are only recorded and logged.

use crate::config::Config;
use crate::context::WorkerContext;
use crate::error::OffgridResult;
use crate::fetch::{FetchProgress, HttpFetcher, NoProgress};
use crate::host::HostSignals;
use crate::manifest::Deployment;
use crate::origin::Origin;
use crate::storage::{DiskStorage, Regions};
use crate::worker::Worker;
use std::sync::Arc;
use tracing::debug;

/// Worker wired to disk storage and the network
pub struct NativeHost {
    pub worker: Worker,
    pub signals: Arc<HostSignals>,
    pub storage: Arc<DiskStorage>,
    pub origin: Origin,
    pub regions: Regions,
}

impl NativeHost {
    /// Load the deployment and build a worker for it
    pub async fn open(config: &Config) -> OffgridResult<Self> {
        Self::open_with_progress(config, Arc::new(NoProgress)).await
    }

    /// Like [`NativeHost::open`], reporting bulk fetches to `progress`
    pub async fn open_with_progress(
        config: &Config,
        progress: Arc<dyn FetchProgress>,
    ) -> OffgridResult<Self> {
        let deployment = Deployment::load(&config.site.deployment).await?;
        Ok(Self::with_deployment(config, deployment, progress))
    }

    pub fn with_deployment(
        config: &Config,
        deployment: Deployment,
        progress: Arc<dyn FetchProgress>,
    ) -> Self {
        let storage = Arc::new(DiskStorage::new(config.storage.root.clone()));
        let signals = Arc::new(HostSignals::new());
        let origin = Origin::new(&config.site.origin);
        let regions = Regions::from(&config.storage);

        debug!(
            "Worker for {} using storage at {}",
            origin,
            config.storage.root.display()
        );

        let ctx = WorkerContext::new(
            storage.clone(),
            Arc::new(HttpFetcher::new(&config.fetch)),
            signals.clone(),
            deployment,
            origin.clone(),
        )
        .with_regions(regions.clone())
        .with_concurrency(config.fetch.concurrency)
        .with_progress(progress);

        Self {
            worker: Worker::new(ctx),
            signals,
            storage,
            origin,
            regions,
        }
    }
}
