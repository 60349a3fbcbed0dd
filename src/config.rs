//! Application configuration loaded from a TOML file
//!
//! Every field has a default, so a missing file or a partial file is fine.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::error::ConfigError;

fn default_debounce_ms() -> u64 {
    300
}

fn default_keep_alive_ms() -> u64 {
    5_000
}

fn default_network_latency_ms() -> u64 {
    150
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Settle window for search input, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long an unobserved screen stays warm, in milliseconds.
    #[serde(default = "default_keep_alive_ms")]
    pub keep_alive_ms: u64,

    /// Artificial latency of the simulated backends, in milliseconds.
    #[serde(default = "default_network_latency_ms")]
    pub network_latency_ms: u64,

    /// Default tracing filter, overridable per run on the command line.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            keep_alive_ms: default_keep_alive_ms(),
            network_latency_ms: default_network_latency_ms(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load from `path` if given, otherwise from the default location.
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("entryflow").join("config.toml"))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_millis(self.keep_alive_ms)
    }

    pub fn network_latency(&self) -> Duration {
        Duration::from_millis(self.network_latency_ms)
    }
}
