//! offgrid - offline cache lifecycle for statically built web apps
//!
//! Stages a deployment's shell files, reconciles the resource cache across
//! deployments by content fingerprint, and serves manifest resources from
//! the cache while lazily filling misses.

pub mod artifact;
pub mod cli;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod host;
pub mod intercept;
pub mod lifecycle;
pub mod manifest;
pub mod manifest_store;
pub mod origin;
pub mod storage;
pub mod ui;
pub mod worker;

pub use artifact::Artifact;
pub use command::{Command, CommandHandler, CommandOutcome};
pub use context::WorkerContext;
pub use error::{OffgridError, OffgridResult};
pub use fetch::{CacheMode, FetchProgress, FetchRequest, Fetcher, HttpFetcher, NoProgress};
pub use host::{HostSignals, WorkerHost};
pub use intercept::{Interception, Interceptor, Request, ServedFrom};
pub use lifecycle::{Activation, LifecycleController};
pub use manifest::{Deployment, PersistedManifest, ResourceManifest};
pub use origin::Origin;
pub use storage::{CacheRegion, DiskStorage, MemoryStorage, Regions, Storage};
pub use worker::{EventOutcome, Worker, WorkerEvent};
