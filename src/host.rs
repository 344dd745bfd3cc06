//! Host environment abstraction
//!
//! The platform that runs the worker decides when a new worker generation
//! takes over open pages. The worker can only ask it to move faster.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Signals a worker can send to its host
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Become the active worker without waiting for older instances to finish
    async fn skip_waiting(&self);

    /// Take control of every open page without a reload
    async fn claim_clients(&self);
}

/// Host that records the signals it receives
///
/// Used by the CLI, where there are no pages to claim, and by tests.
#[derive(Debug, Default)]
pub struct HostSignals {
    skip_waiting: AtomicUsize,
    claims: AtomicUsize,
}

impl HostSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `skip_waiting` was requested
    pub fn skip_waiting_count(&self) -> usize {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// How many times `claim_clients` was requested
    pub fn claim_count(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerHost for HostSignals {
    async fn skip_waiting(&self) {
        self.skip_waiting.fetch_add(1, Ordering::SeqCst);
        info!("Worker requested immediate activation");
    }

    async fn claim_clients(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
        info!("Worker claimed open clients");
    }
}
