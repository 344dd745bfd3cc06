//! Fetch command - run a request through the interceptor

use crate::cli::args::FetchArgs;
use crate::cli::NativeHost;
use crate::config::Config;
use crate::error::{OffgridError, OffgridResult};
use crate::intercept::{Interception, Request};
use crate::worker::{EventOutcome, WorkerEvent};
use console::style;
use tokio::fs;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> OffgridResult<()> {
    let host = NativeHost::open(config).await?;

    let url = if args.url.starts_with("http://") || args.url.starts_with("https://") {
        args.url
    } else {
        host.origin.url_for(&args.url)
    };
    let request = Request::new(args.method, url);

    let interception = match host.worker.dispatch(WorkerEvent::Fetch(request.clone())).await? {
        EventOutcome::Fetched(interception) => interception,
        other => {
            return Err(OffgridError::Internal(format!(
                "fetch returned {:?}",
                other
            )))
        }
    };

    match interception {
        Interception::Passthrough => {
            println!("{} {}", style("passthrough").dim(), request.url);
        }
        Interception::Served { artifact, from } => {
            let status = if artifact.is_ok() {
                style(artifact.status.to_string()).green()
            } else {
                style(artifact.status.to_string()).yellow()
            };
            println!("{} {} {} bytes", status, from, artifact.len());

            if let Some(path) = args.output {
                fs::write(&path, &artifact.body).await.map_err(|e| {
                    OffgridError::io(format!("writing body to {}", path.display()), e)
                })?;
            }
        }
    }

    Ok(())
}
