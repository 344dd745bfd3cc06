//! Out-of-band commands from controlled pages

use crate::artifact::Artifact;
use crate::context::WorkerContext;
use crate::error::{OffgridError, OffgridResult};
use crate::fetch::{fetch_ok, FetchRequest};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// A command decoded from a page message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Take over immediately instead of waiting for old pages to close
    ActivateNow,
    /// Fetch every manifest resource that is not cached yet
    DownloadOffline,
}

impl Command {
    /// Wire payload for this command
    pub fn as_message(&self) -> &'static str {
        match self {
            Self::ActivateNow => "skipWaiting",
            Self::DownloadOffline => "downloadOffline",
        }
    }

    /// Decode a message, ignoring anything that is not a known command
    pub fn from_message(payload: &str) -> Option<Self> {
        payload.parse().ok()
    }
}

impl FromStr for Command {
    type Err = OffgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skipWaiting" => Ok(Self::ActivateNow),
            "downloadOffline" => Ok(Self::DownloadOffline),
            other => Err(OffgridError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_message())
    }
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    SkippedWaiting,
    Downloaded { added: usize },
}

/// Executes page commands
pub struct CommandHandler {
    ctx: WorkerContext,
}

impl CommandHandler {
    pub fn new(ctx: WorkerContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, command: Command) -> OffgridResult<CommandOutcome> {
        match command {
            Command::ActivateNow => {
                self.ctx.host.skip_waiting().await;
                Ok(CommandOutcome::SkippedWaiting)
            }
            Command::DownloadOffline => {
                let added = self.download_offline().await?;
                Ok(CommandOutcome::Downloaded { added })
            }
        }
    }

    /// Fill the resource region with every missing manifest key
    ///
    /// Behaves like a bulk add: if any fetch fails or returns a non-2xx
    /// status, nothing is stored. Returns the number of entries added.
    pub async fn download_offline(&self) -> OffgridResult<usize> {
        let ctx = &self.ctx;
        let region = ctx.storage.open(&ctx.regions.resources).await?;

        let present: HashSet<String> = region
            .keys()
            .await?
            .iter()
            .filter_map(|url| ctx.origin.entry_key(url))
            .collect();

        let missing: Vec<&str> = ctx
            .deployment
            .resources
            .keys()
            .filter(|key| !present.contains(*key))
            .collect();

        if missing.is_empty() {
            debug!("Every resource is already cached");
            return Ok(0);
        }
        let total = missing.len();
        info!("Downloading {} resources for offline use", total);
        ctx.progress.on_batch_start(total);
        let done = AtomicUsize::new(0);
        let done = &done;

        let fetched: Vec<(String, Artifact)> = stream::iter(missing)
            .map(|key| async move {
                let url = ctx.origin.url_for(key);
                let artifact = fetch_ok(&*ctx.fetcher, &FetchRequest::get(url.as_str())).await?;
                let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                ctx.progress.on_fetched(key, n, total);
                Ok::<_, OffgridError>((url, artifact))
            })
            .buffer_unordered(ctx.concurrency.max(1))
            .try_collect()
            .await?;

        let added = fetched.len();
        for (url, artifact) in fetched {
            region.put(&url, artifact).await?;
        }

        info!("Cached {} resources for offline use", added);
        Ok(added)
    }
}
