//! Configuration management for Quire.
//!
//! Configuration is read from `~/.config/quire/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod policy;

pub use policy::{Disposition, SectionPolicy};

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::instant::{DETAIL_SEPARATOR, MODIFICATION_SEPARATOR};

pub const DEFAULT_BASE_URL: &str = "https://mapping-test.fra1.digitaloceanspaces.com/data";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub timestamps: TimestampConfig,
    pub sections: SectionPolicy,
    pub daemon: DaemonSettings,
}

/// Where the provider lives and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root of the catalog, detail and media endpoints.
    pub base_url: String,
    /// Per-request timeout in seconds (default: 10)
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            user_agent: concat!("quire/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Time separators per endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TimestampConfig {
    /// Used for the item's `pub_date`.
    pub detail_separator: char,
    /// Used for the item's `mod_date`, which the provider writes differently.
    pub modification_separator: char,
    pub media_separator: char,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            detail_separator: DETAIL_SEPARATOR,
            modification_separator: MODIFICATION_SEPARATOR,
            media_separator: DETAIL_SEPARATOR,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Delay between the end of one cycle and the start of the next (default: 300)
    pub interval_secs: u64,
    /// Maximum concurrent item resolutions (default: 10)
    pub workers: usize,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            workers: 10,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/quire/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("quire").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# Quire Configuration

[source]
# Root of the provider endpoints:
#   <base_url>/list.json
#   <base_url>/articles/<id>.json
#   <base_url>/media/<id>.json
base_url = "https://mapping-test.fra1.digitaloceanspaces.com/data"

# Request timeout in seconds
timeout_secs = 10

[timestamps]
# Separator between hour, minute and second in provider dates,
# e.g. "2020-07-08-20;50;43"
detail_separator = ";"
media_separator = ";"

# An item's mod_date is written with colons, e.g. "2020-07-09-10:00:00"
modification_separator = ":"

[sections]
# What happens to a section that cannot be mapped: "skip" drops the
# section, "abort" rejects the whole item.
on_unknown_type = "skip"
on_invalid = "abort"

[daemon]
# Seconds to wait after a cycle before starting the next one
interval_secs = 300

# Maximum number of items resolved at the same time
workers = 10
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
