//! Error types for offgrid
//!
//! All modules use `OffgridResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for offgrid operations
pub type OffgridResult<T> = Result<T, OffgridError>;

/// All errors that can occur in offgrid
#[derive(Error, Debug)]
pub enum OffgridError {
    // Network errors
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Request to {url} returned HTTP {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Failed to stage shell file {key}: {source}")]
    ShellFetch {
        key: String,
        #[source]
        source: Box<OffgridError>,
    },

    // Storage errors
    #[error("Storage error in region {region}: {reason}")]
    Storage { region: String, reason: String },

    #[error("Cache region not found: {0}")]
    RegionMissing(String),

    #[error("Persisted manifest is unreadable: {0}")]
    ManifestCorrupt(String),

    // Deployment errors
    #[error("Invalid deployment manifest at {path}: {reason}")]
    DeploymentInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // Command errors
    #[error("Unknown worker command: {0}")]
    UnknownCommand(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl OffgridError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a storage error scoped to a region
    pub fn storage(region: impl Into<String>, reason: impl ToString) -> Self {
        Self::Storage {
            region: region.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if error is retryable
    ///
    /// Network-class failures clear up on their own; the host retries
    /// install on the next lifecycle cycle.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::BadStatus { status, .. } => *status >= 500,
            Self::ShellFetch { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Network { .. } | Self::ShellFetch { .. } => {
                Some("Check that the site origin is reachable: offgrid config show")
            }
            Self::DeploymentInvalid { .. } => {
                Some("Regenerate the deployment manifest with your build tooling")
            }
            Self::RegionMissing(_) => Some("Run: offgrid install && offgrid activate"),
            Self::UnknownCommand(_) => Some("Valid commands: skipWaiting, downloadOffline"),
            _ => None,
        }
    }
}
