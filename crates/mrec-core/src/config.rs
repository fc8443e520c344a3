//! Configuration for mrec
//!
//! Stored in `<config dir>/mrec/config.toml` unless overridden.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "mrec";
const CONFIG_FILE: &str = "config.toml";

/// How `Store::load` treats a row whose fields do not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Keep the row, substituting zero values for unparseable fields
    #[default]
    ZeroFill,
    /// Drop the row
    Skip,
    /// Abort the load with `Error::Malformed`
    Reject,
}

impl std::str::FromStr for LoadPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero_fill" | "zero-fill" | "zerofill" => Ok(LoadPolicy::ZeroFill),
            "skip" => Ok(LoadPolicy::Skip),
            "reject" => Ok(LoadPolicy::Reject),
            _ => Err(crate::Error::Config(format!("Invalid load policy: {}", s))),
        }
    }
}

impl std::fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadPolicy::ZeroFill => write!(f, "zero_fill"),
            LoadPolicy::Skip => write!(f, "skip"),
            LoadPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// mrec configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV file the records are loaded from and saved to
    pub data_file: PathBuf,

    /// Handling of unparseable fields when loading
    pub load_policy: LoadPolicy,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data.csv"),
            load_policy: LoadPolicy::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,

    /// Timestamp format for listings (strftime)
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl Config {
    /// Default config location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load config from a TOML file, falling back to defaults when absent
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Invalid config: {}", e)))?;
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# mrec configuration

# CSV file records are loaded from at startup and saved to on exit
data_file = "data.csv"

# What to do with rows whose timestamp, id or measurement do not parse:
#   zero_fill - keep the row, use zero values for the bad fields
#   skip      - drop the row
#   reject    - refuse to load the file
load_policy = "zero_fill"

[display]
# Use colors in output
colors = true

# Timestamp format for listings (strftime format)
date_format = "%Y-%m-%d %H:%M:%S"
"#
        .to_string()
    }
}
