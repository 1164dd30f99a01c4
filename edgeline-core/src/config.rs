//! Service configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Root directory holding the raw/processed/exchange-inbox stores.
    pub data_dir: PathBuf,
    /// Also persist the pre-binarization probability map next to each mask.
    pub save_probability_map: bool,
    /// Upper bound for a single uploaded file, in bytes.
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            data_dir: PathBuf::from("./images"),
            save_probability_map: false,
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Config> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Configuration(format!("Invalid config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.trim().is_empty() {
            return Err(Error::Configuration("listen_addr must not be empty".to_string()));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Configuration("data_dir must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Configuration("max_upload_bytes must be non-zero".to_string()));
        }
        Ok(())
    }
}
