//! Activate command - commit the staged generation

use crate::cli::NativeHost;
use crate::config::Config;
use crate::error::{OffgridError, OffgridResult};
use crate::lifecycle::Activation;
use crate::storage::Storage;
use crate::ui::{self, UiContext};
use crate::worker::{EventOutcome, WorkerEvent};

/// Execute the activate command
pub async fn execute(config: &Config) -> OffgridResult<()> {
    let ctx = UiContext::detect();
    let host = NativeHost::open(config).await?;

    // The worker tolerates an empty staging region; from the CLI it means
    // `install` was never run
    if !host.storage.has(&host.regions.staging).await? {
        return Err(OffgridError::RegionMissing(host.regions.staging.clone()));
    }

    let activation = match host.worker.dispatch(WorkerEvent::Activate).await? {
        EventOutcome::Activated(activation) => activation,
        other => {
            return Err(OffgridError::Internal(format!(
                "activate returned {:?}",
                other
            )))
        }
    };

    match &activation {
        Activation::Fresh { copied } => {
            ui::step_ok_detail(
                &ctx,
                "First generation activated",
                &format!("{} shell files", copied),
            );
            ui::remark(&ctx, "Other resources are cached on first request");
            ui::outro_success(&ctx, "Cache is live");
        }
        Activation::Upgraded {
            evicted,
            retained,
            copied,
        } => {
            ui::step_ok(&ctx, "Generation upgraded");
            ui::key_value(&ctx, "evicted", &evicted.to_string());
            ui::key_value(&ctx, "retained", &retained.to_string());
            ui::key_value(&ctx, "shell refreshed", &copied.to_string());
            ui::outro_success(&ctx, "Cache is live");
        }
        Activation::Reset { reason } => {
            ui::step_warn_hint(
                &ctx,
                &format!("Activation failed: {}", reason),
                "All cache regions were cleared; run `offgrid install` again",
            );
            ui::outro_warn(&ctx, "Cache reset");
        }
    }

    Ok(())
}
