//! Per-file progress for bulk fetches
//!
//! Interactive terminals get an indicatif bar counting fetched files; CI and
//! pipes get one plain line per file.

use super::context::UiContext;
use crate::fetch::FetchProgress;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TEMPLATE: &str =
    "  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}";

/// Progress display for `install` and `downloadOffline`
pub struct FetchBar {
    bar: Option<ProgressBar>,
    label: String,
}

impl FetchBar {
    pub fn new(ctx: &UiContext, label: &str) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new(0);
            if let Ok(template) = ProgressStyle::default_bar().template(TEMPLATE) {
                bar.set_style(template.progress_chars("━╸─"));
            }
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        });

        Self {
            bar,
            label: label.to_string(),
        }
    }

    /// Remove the bar so the final status line stands alone
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

impl FetchProgress for FetchBar {
    fn on_batch_start(&self, total: usize) {
        match self.bar {
            Some(ref bar) => bar.set_length(total as u64),
            None => println!("{} {} {} files", style("...").dim(), self.label, total),
        }
    }

    fn on_fetched(&self, key: &str, done: usize, total: usize) {
        match self.bar {
            Some(ref bar) => {
                bar.set_position(done as u64);
                bar.set_message(key.to_string());
            }
            None => println!("  [{}/{}] {}", done, total, key),
        }
    }
}

impl Drop for FetchBar {
    fn drop(&mut self) {
        self.finish();
    }
}
