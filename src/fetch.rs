//! Network access
//!
//! The worker makes exactly one attempt per fetch; retry and timeout policy
//! belong to the underlying client.

use crate::artifact::Artifact;
use crate::config::FetchConfig;
use crate::error::{OffgridError, OffgridResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// HTTP cache directive attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Let intermediaries answer from their caches
    #[default]
    Default,
    /// Force a round trip to the origin server
    Reload,
}

/// A request the worker sends to the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub cache_mode: CacheMode,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cache_mode: CacheMode::Default,
        }
    }

    /// Same request, bypassing HTTP caches
    pub fn reload(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cache_mode: CacheMode::Reload,
        }
    }
}

/// Performs network fetches on behalf of the worker
///
/// A response with any status is `Ok`; only transport failures are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> OffgridResult<Artifact>;
}

/// Observer of bulk fetches during install and offline download
///
/// Called once a batch is known and again as each file lands. Calls may
/// come from concurrent fetches in any order; `done` is monotonic.
pub trait FetchProgress: Send + Sync {
    fn on_batch_start(&self, _total: usize) {}

    fn on_fetched(&self, _key: &str, _done: usize, _total: usize) {}
}

/// Progress observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl FetchProgress for NoProgress {}

/// Fetcher backed by a blocking `ureq` agent
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .build();

        Self {
            agent: agent_config.into(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    fn fetch_blocking(agent: &Agent, request: &FetchRequest, limit: u64) -> OffgridResult<Artifact> {
        let mut builder = agent.get(request.url.as_str());
        if request.cache_mode == CacheMode::Reload {
            builder = builder
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache");
        }

        let mut response = builder
            .call()
            .map_err(|e| OffgridError::network(&request.url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .body_mut()
            .with_config()
            .limit(limit)
            .read_to_vec()
            .map_err(|e| OffgridError::network(&request.url, e))?;

        Ok(Artifact {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> OffgridResult<Artifact> {
        let agent = self.agent.clone();
        let owned = request.clone();
        let limit = self.max_body_bytes;

        let artifact =
            tokio::task::spawn_blocking(move || Self::fetch_blocking(&agent, &owned, limit))
                .await
                .map_err(|e| OffgridError::Internal(format!("fetch task failed: {}", e)))??;

        debug!(
            "GET {} -> {} ({} bytes)",
            request.url,
            artifact.status,
            artifact.len()
        );
        Ok(artifact)
    }
}

/// Fetch and require a 2xx status
pub async fn fetch_ok(fetcher: &dyn Fetcher, request: &FetchRequest) -> OffgridResult<Artifact> {
    let artifact = fetcher.fetch(request).await?;
    if artifact.is_ok() {
        Ok(artifact)
    } else {
        Err(OffgridError::BadStatus {
            url: request.url.clone(),
            status: artifact.status,
        })
    }
}
