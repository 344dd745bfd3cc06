//! Configuration file handling

pub mod schema;

pub use schema::{Config, FetchConfig, GeneralConfig, SiteConfig, StorageConfig};

use crate::error::{OffgridError, OffgridResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes the TOML config file
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config file
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.config/offgrid/config.toml`, or the platform equivalent
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("offgrid").join("config.toml")
    }

    /// Load the config file; a missing file yields the defaults
    pub async fn load(&self) -> OffgridResult<Config> {
        match self.load_from_file(&self.path).await {
            Err(OffgridError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                Ok(Config::default())
            }
            other => other,
        }
    }

    /// Load configuration from a specific file, which must exist
    pub async fn load_from_file(&self, path: &Path) -> OffgridResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| OffgridError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| OffgridError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the config, creating its directory first
    pub async fn save(&self, config: &Config) -> OffgridResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|source| OffgridError::ConfigDirCreate {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let rendered = toml::to_string_pretty(config)?;
        fs::write(&self.path, rendered).await.map_err(|e| {
            OffgridError::io(format!("writing config to {}", self.path.display()), e)
        })?;

        info!("Wrote config to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
