//! Shared collaborators of the worker's handlers

use crate::fetch::{FetchProgress, Fetcher, NoProgress};
use crate::host::WorkerHost;
use crate::manifest::Deployment;
use crate::origin::Origin;
use crate::storage::{Regions, Storage};
use std::sync::Arc;

/// Default number of concurrent fetches for bulk operations
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Everything a handler needs: storage, network, host and the baked-in deployment
#[derive(Clone)]
pub struct WorkerContext {
    pub storage: Arc<dyn Storage>,
    pub fetcher: Arc<dyn Fetcher>,
    pub host: Arc<dyn WorkerHost>,
    pub deployment: Arc<Deployment>,
    pub origin: Origin,
    pub regions: Regions,
    /// Upper bound on in-flight fetches during install and offline download
    pub concurrency: usize,
    pub progress: Arc<dyn FetchProgress>,
}

impl WorkerContext {
    pub fn new(
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn WorkerHost>,
        deployment: Deployment,
        origin: Origin,
    ) -> Self {
        Self {
            storage,
            fetcher,
            host,
            deployment: Arc::new(deployment),
            origin,
            regions: Regions::default(),
            concurrency: DEFAULT_CONCURRENCY,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_regions(mut self, regions: Regions) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn FetchProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}
