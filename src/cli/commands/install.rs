//! Install command - stage the shell files of the current deployment

use crate::cli::NativeHost;
use crate::config::Config;
use crate::error::{OffgridError, OffgridResult};
use crate::ui::{self, FetchBar, UiContext};
use crate::worker::{EventOutcome, WorkerEvent};
use std::sync::Arc;

/// Execute the install command
pub async fn execute(config: &Config) -> OffgridResult<()> {
    let ctx = UiContext::detect();
    let bar = Arc::new(FetchBar::new(&ctx, "Staging"));
    let host = NativeHost::open_with_progress(config, bar.clone()).await?;

    let outcome = host.worker.dispatch(WorkerEvent::Install).await;
    bar.finish();

    match outcome {
        Ok(EventOutcome::Installed { staged }) => {
            ui::step_ok(&ctx, &format!("Staged {} shell files", staged));
            ui::remark(&ctx, "Run `offgrid activate` to commit this generation");
            Ok(())
        }
        Ok(other) => Err(OffgridError::Internal(format!(
            "install returned {:?}",
            other
        ))),
        Err(e) => {
            ui::step_warn_hint(&ctx, "Install failed", "nothing was staged");
            Err(e)
        }
    }
}
