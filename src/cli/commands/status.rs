//! Status command - show cache regions and drift from the deployment

use crate::cli::args::{OutputFormat, StatusArgs};
use crate::config::Config;
use crate::error::OffgridResult;
use crate::manifest::Deployment;
use crate::manifest_store::ManifestStore;
use crate::origin::Origin;
use crate::storage::{DiskStorage, Regions, Storage};
use crate::ui::{self, UiContext};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Serialize)]
struct RegionStatus {
    role: &'static str,
    name: String,
    exists: bool,
    entries: usize,
}

#[derive(Debug, Serialize)]
struct DeploymentStatus {
    resources: usize,
    cached: usize,
    /// Manifest keys not in the resource cache yet
    missing: Vec<String>,
    /// Cached keys the next activation will evict
    stale: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    origin: String,
    regions: Vec<RegionStatus>,
    activated_at: Option<String>,
    deployment: Option<DeploymentStatus>,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> OffgridResult<()> {
    let report = collect(config).await?;

    match args.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => print_plain(&report),
    }

    Ok(())
}

async fn collect(config: &Config) -> OffgridResult<StatusReport> {
    let storage = DiskStorage::new(config.storage.root.clone());
    let regions = Regions::from(&config.storage);
    let origin = Origin::new(&config.site.origin);

    let mut region_status = Vec::new();
    for (role, name) in [
        ("resources", &regions.resources),
        ("staging", &regions.staging),
        ("manifest", &regions.manifest),
    ] {
        // Opening would create the region, so only look at existing ones
        let exists = storage.has(name).await?;
        let entries = if exists {
            storage.open(name).await?.keys().await?.len()
        } else {
            0
        };
        region_status.push(RegionStatus {
            role,
            name: name.clone(),
            exists,
            entries,
        });
    }

    let persisted = if storage.has(&regions.manifest).await? {
        ManifestStore::new(storage.open(&regions.manifest).await?)
            .load()
            .await?
    } else {
        None
    };

    let cached_keys: BTreeSet<String> = if storage.has(&regions.resources).await? {
        storage
            .open(&regions.resources)
            .await?
            .keys()
            .await?
            .iter()
            .filter_map(|url| origin.entry_key(url))
            .collect()
    } else {
        BTreeSet::new()
    };

    let deployment = match Deployment::load(&config.site.deployment).await {
        Ok(deployment) => Some(deployment),
        Err(e) => {
            debug!("No deployment to compare against: {}", e);
            None
        }
    };

    let deployment_status = deployment.map(|deployment| {
        let manifest = &deployment.resources;
        let missing = manifest
            .keys()
            .filter(|key| !cached_keys.contains(*key))
            .map(str::to_string)
            .collect();
        let stale = match &persisted {
            Some(previous) => cached_keys
                .iter()
                .filter(|key| !manifest.retains(&previous.resources, key))
                .cloned()
                .collect(),
            None => cached_keys.iter().cloned().collect(),
        };
        DeploymentStatus {
            resources: manifest.len(),
            cached: cached_keys.iter().filter(|k| manifest.contains(k)).count(),
            missing,
            stale,
        }
    });

    Ok(StatusReport {
        origin: origin.to_string(),
        regions: region_status,
        activated_at: persisted
            .and_then(|p| p.activated_at)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        deployment: deployment_status,
    })
}

fn print_table(report: &StatusReport) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "offgrid status");
    ui::key_value(&ctx, "origin", &report.origin);
    ui::key_value(
        &ctx,
        "last activation",
        report.activated_at.as_deref().unwrap_or("never"),
    );

    ui::section(&ctx, "Regions");
    for region in &report.regions {
        if region.exists {
            ui::key_value_status(
                &ctx,
                region.role,
                &format!("{} ({} entries)", region.name, region.entries),
                true,
            );
        } else {
            ui::key_value_status(&ctx, region.role, &format!("{} (absent)", region.name), false);
        }
    }

    ui::section(&ctx, "Deployment");
    match &report.deployment {
        Some(status) => {
            ui::key_value_status(
                &ctx,
                "cached",
                &format!("{}/{}", status.cached, status.resources),
                status.missing.is_empty(),
            );
            if !status.stale.is_empty() {
                ui::step_warn_hint(
                    &ctx,
                    &format!("{} cached entries are stale", status.stale.len()),
                    "Run: offgrid install && offgrid activate",
                );
            }
            if !status.missing.is_empty() {
                ui::remark(&ctx, "Run `offgrid message downloadOffline` to cache everything");
            }
        }
        None => ui::step_info(&ctx, "No deployment file found"),
    }
}

fn print_plain(report: &StatusReport) {
    for region in &report.regions {
        let state = if region.exists { "present" } else { "absent" };
        println!("{}\t{}\t{}\t{}", region.role, region.name, state, region.entries);
    }
}
