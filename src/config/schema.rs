//! Configuration schema for offgrid
//!
//! Configuration is stored at `~/.config/offgrid/config.toml`

use crate::context::DEFAULT_CONCURRENCY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// The site being cached
    pub site: SiteConfig,

    /// Cache region storage
    pub storage: StorageConfig,

    /// Network client settings
    pub fetch: FetchConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Site settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin the worker serves (scheme, host and port)
    pub origin: String,

    /// Deployment file written by the build: resource manifest and shell list
    pub deployment: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5060".to_string(),
            deployment: PathBuf::from("build/web/offgrid-deployment.json"),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per region
    pub root: PathBuf,

    /// Staging region name
    pub staging: String,

    /// Resource region name
    pub resources: String,

    /// Manifest region name
    pub manifest: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("offgrid")
                .join("storage"),
            staging: "offgrid-temp-cache".to_string(),
            resources: "offgrid-app-cache".to_string(),
            manifest: "offgrid-app-manifest".to_string(),
        }
    }
}

/// Network client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Largest response body accepted
    pub max_body_bytes: u64,

    /// Concurrent fetches during install and offline download
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_body_bytes: 64 * 1024 * 1024,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}
