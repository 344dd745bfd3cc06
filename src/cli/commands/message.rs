//! Message command - deliver a page command to the worker

use crate::cli::args::MessageArgs;
use crate::cli::NativeHost;
use crate::command::{Command, CommandOutcome};
use crate::config::Config;
use crate::error::OffgridResult;
use crate::ui::{self, FetchBar, UiContext};
use crate::worker::{EventOutcome, WorkerEvent};
use std::sync::Arc;

/// Execute the message command
pub async fn execute(args: MessageArgs, config: &Config) -> OffgridResult<()> {
    // Reject unknown payloads before touching the deployment
    let command: Command = args.payload.parse()?;

    let ctx = UiContext::detect();
    let bar = Arc::new(FetchBar::new(&ctx, "Downloading"));
    let host = NativeHost::open_with_progress(config, bar.clone()).await?;

    let outcome = host.worker.dispatch(WorkerEvent::Message(args.payload)).await;
    bar.finish();

    match outcome {
        Ok(EventOutcome::Handled(Some(CommandOutcome::SkippedWaiting))) => {
            ui::step_ok(&ctx, "Worker will activate without waiting");
        }
        Ok(EventOutcome::Handled(Some(CommandOutcome::Downloaded { added: 0 }))) => {
            ui::step_info(&ctx, "Every resource is already cached");
        }
        Ok(EventOutcome::Handled(Some(CommandOutcome::Downloaded { added }))) => {
            ui::step_ok(&ctx, &format!("Cached {} resources for offline use", added));
        }
        Ok(_) => ui::step_info(&ctx, "Message ignored"),
        Err(e) => {
            if command == Command::DownloadOffline {
                ui::step_warn_hint(
                    &ctx,
                    "Download failed",
                    "nothing was cached; the download is all-or-nothing",
                );
            }
            return Err(e);
        }
    }

    Ok(())
}
