//! Engine configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Storage engine configuration parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data roots the engine stores tablets and snapshots under.
    pub data_dirs: Vec<PathBuf>,

    /// Default snapshot lifetime in seconds, recorded in snapshot
    /// directory names when a request carries no timeout (default: 1 day).
    pub snapshot_expire_secs: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dirs: vec![PathBuf::from("./tessera-data")],
            snapshot_expire_secs: 86_400,
        }
    }
}

impl StorageConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the data root list with a single root (builder pattern).
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dirs = vec![dir.into()];
        self
    }

    /// Append a data root (builder pattern).
    pub fn add_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dirs.push(dir.into());
        self
    }

    /// Set the default snapshot lifetime (builder pattern).
    pub fn with_snapshot_expire_secs(mut self, secs: i64) -> Self {
        self.snapshot_expire_secs = secs;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), StorageConfigError> {
        if self.data_dirs.is_empty() {
            return Err(StorageConfigError::NoDataDirs);
        }
        if self.snapshot_expire_secs <= 0 {
            return Err(StorageConfigError::NonPositiveExpiry);
        }
        Ok(())
    }
}

/// Storage configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageConfigError {
    /// At least one data root is required.
    #[error("at least one data dir must be configured")]
    NoDataDirs,

    /// The default snapshot expiry must be positive.
    #[error("snapshot expiry must be positive")]
    NonPositiveExpiry,
}
