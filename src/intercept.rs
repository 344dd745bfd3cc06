//! Request interception
//!
//! Only `GET` requests for keys listed in the resource manifest are
//! handled; everything else passes through to the network untouched.
//! The root document is served online-first so returning users see the
//! newest shell; all other resources are served cache-first and filled
//! lazily on a miss.

use crate::artifact::Artifact;
use crate::context::WorkerContext;
use crate::error::OffgridResult;
use crate::fetch::FetchRequest;
use crate::origin::ROOT_KEY;
use crate::storage::CacheRegion;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// An intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }

    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    /// URL as sent on the wire; fragments never leave the client
    pub fn network_url(&self) -> &str {
        match self.url.find('#') {
            Some(idx) => &self.url[..idx],
            None => &self.url,
        }
    }
}

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
}

impl fmt::Display for ServedFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// Decision for one intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// Not ours: the host performs the request itself
    Passthrough,
    /// Answered by the worker
    Served {
        artifact: Artifact,
        from: ServedFrom,
    },
}

/// Serves manifest resources from the resource region
pub struct Interceptor {
    ctx: WorkerContext,
}

impl Interceptor {
    pub fn new(ctx: WorkerContext) -> Self {
        Self { ctx }
    }

    /// Handle one request
    ///
    /// Network failures with nothing cached are returned unchanged.
    pub async fn handle(&self, request: &Request) -> OffgridResult<Interception> {
        if request.method != "GET" {
            return Ok(Interception::Passthrough);
        }

        let Some(key) = self.ctx.origin.request_key(&request.url) else {
            return Ok(Interception::Passthrough);
        };

        if !self.ctx.deployment.resources.contains(&key) {
            debug!("Passing through {} (not a manifest resource)", request.url);
            return Ok(Interception::Passthrough);
        }

        let cache_url = self.ctx.origin.url_for(&key);
        if key == ROOT_KEY {
            self.online_first(request, &cache_url).await
        } else {
            self.cache_first(request, &cache_url).await
        }
    }

    async fn resources(&self) -> OffgridResult<Arc<dyn CacheRegion>> {
        self.ctx.storage.open(&self.ctx.regions.resources).await
    }

    async fn cache_first(&self, request: &Request, cache_url: &str) -> OffgridResult<Interception> {
        let region = self.resources().await?;
        if let Some(artifact) = region.get(cache_url).await? {
            return Ok(Interception::Served {
                artifact,
                from: ServedFrom::Cache,
            });
        }

        let artifact = self
            .ctx
            .fetcher
            .fetch(&FetchRequest::get(request.network_url()))
            .await?;

        if artifact.is_ok() {
            store(&*region, cache_url, &artifact).await;
        }

        Ok(Interception::Served {
            artifact,
            from: ServedFrom::Network,
        })
    }

    /// Network first, falling back to the cached copy when offline
    async fn online_first(
        &self,
        request: &Request,
        cache_url: &str,
    ) -> OffgridResult<Interception> {
        let network_err = match self
            .ctx
            .fetcher
            .fetch(&FetchRequest::get(request.network_url()))
            .await
        {
            Ok(artifact) => {
                if artifact.is_ok() {
                    match self.resources().await {
                        Ok(region) => store(&*region, cache_url, &artifact).await,
                        Err(e) => warn!("Could not open resource cache: {}", e),
                    }
                }
                return Ok(Interception::Served {
                    artifact,
                    from: ServedFrom::Network,
                });
            }
            Err(e) => e,
        };

        debug!("Network failed for {}, trying cache: {}", cache_url, network_err);
        let cached = match self.resources().await {
            Ok(region) => region.get(cache_url).await,
            Err(e) => Err(e),
        };

        match cached {
            Ok(Some(artifact)) => Ok(Interception::Served {
                artifact,
                from: ServedFrom::Cache,
            }),
            Ok(None) => Err(network_err),
            Err(e) => {
                warn!("Cache lookup for {} failed: {}", cache_url, e);
                Err(network_err)
            }
        }
    }
}

/// Best-effort cache fill; a failed put never fails the response
async fn store(region: &dyn CacheRegion, cache_url: &str, artifact: &Artifact) {
    match region.put(cache_url, artifact.clone()).await {
        Ok(()) => debug!("Cached {}", cache_url),
        Err(e) => warn!("Failed to cache {}: {}", cache_url, e),
    }
}
