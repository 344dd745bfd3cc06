//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{OffgridError, OffgridResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

const VALID_KEYS: [&str; 10] = [
    "general.log_format",
    "site.origin",
    "site.deployment",
    "storage.root",
    "storage.staging",
    "storage.resources",
    "storage.manifest",
    "fetch.timeout_secs",
    "fetch.max_body_bytes",
    "fetch.concurrency",
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> OffgridResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            manager.save(&updated).await?;

            let ctx = UiContext::detect();
            ui::step_ok(&ctx, &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> OffgridResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> OffgridResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

/// Apply a dot-separated key to a config
fn set_value(config: &mut Config, key: &str, value: &str) -> OffgridResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(OffgridError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },

        ["site", "origin"] => config.site.origin = value.trim_end_matches('/').to_string(),
        ["site", "deployment"] => config.site.deployment = PathBuf::from(value),

        ["storage", "root"] => config.storage.root = PathBuf::from(value),
        ["storage", "staging"] => config.storage.staging = value.to_string(),
        ["storage", "resources"] => config.storage.resources = value.to_string(),
        ["storage", "manifest"] => config.storage.manifest = value.to_string(),

        ["fetch", "timeout_secs"] => config.fetch.timeout_secs = parse_number(value)?,
        ["fetch", "max_body_bytes"] => config.fetch.max_body_bytes = parse_number(value)?,
        ["fetch", "concurrency"] => config.fetch.concurrency = parse_number(value)?,

        _ => {
            return Err(OffgridError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(value: &str) -> OffgridResult<T> {
    value
        .parse()
        .map_err(|_| OffgridError::User(format!("Invalid number: {}", value)))
}
