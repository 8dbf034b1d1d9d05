//! Configuration for query output.
//!
//! Config file resolution order:
//! 1. Explicit path passed to `Config::load_from()`
//! 2. SQLFS_CONFIG environment variable
//! 3. Default: `<config dir>/sqlfs/config.toml`
//!
//! A missing file at the default location yields the built-in defaults.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SQLFS_CONFIG";

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Smallest width a table column is ever rendered at.
    #[serde(default = "default_min_column_width")]
    pub min_column_width: usize,

    /// chrono format string for `lastmod` and `createdt`.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Print the "Getting files from folders" line before the table.
    #[serde(default = "default_show_sources")]
    pub show_sources: bool,
}

fn default_min_column_width() -> usize {
    10
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_show_sources() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_column_width: default_min_column_width(),
            date_format: default_date_format(),
            show_sources: default_show_sources(),
        }
    }
}

impl Config {
    /// Load config using the default resolution order.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from a specific file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse config from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        if config.min_column_width == 0 {
            return Err(Error::Config(
                "min_column_width must be at least 1".to_string(),
            ));
        }
        if StrftimeItems::new(&config.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::Config(format!(
                "invalid date_format \"{}\"",
                config.date_format
            )));
        }
        Ok(config)
    }

    /// Serialize config to TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }
}

/// Default config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sqlfs").map(|dirs| dirs.config_dir().join("config.toml"))
}
