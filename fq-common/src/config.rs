//! Configuration loading and data folder resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Every section
//! and every field is optional: a missing or unreadable file never stops the
//! library, it degrades to compiled defaults with a warning.
//!
//! Priority order for values that can be overridden:
//! 1. Environment variable
//! 2. TOML config file
//! 3. Compiled default

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "FLATQUOTE_CONFIG";

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "FLATQUOTE_DATA_FOLDER";

/// Database file name inside the data folder
pub const DATABASE_FILE_NAME: &str = "flatquote.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// Folder holding the SQLite database (optional)
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Remote catalog settings (optional)
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Session pacing settings (optional)
    #[serde(default)]
    pub session: SessionSection,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[catalog]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CatalogSection {
    /// Base URL (or full URL) of the product lookup endpoint
    pub api_url: Option<String>,
    /// Base URL (or full URL) of the design-code lookup endpoint
    pub design_api_url: Option<String>,
    /// Locale sent with every lookup
    pub locale: Option<String>,
    /// Fixed delay before every product request
    pub request_delay_ms: Option<u64>,
    /// HTTP client timeout
    pub timeout_secs: Option<u64>,
}

/// `[session]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SessionSection {
    /// Pause between consecutive identifiers of a typed list
    pub list_pacing_ms: Option<u64>,
    /// Pause between consecutive lines of a design code
    pub code_pacing_ms: Option<u64>,
}

/// Locate the config file: `FLATQUOTE_CONFIG`, then the user config dir
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("flatquote").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load the config file if present, falling back to defaults
pub fn load_toml_config_or_default() -> TomlConfig {
    let Some(path) = config_file_path() else {
        debug!("No config directory available, using defaults");
        return TomlConfig::default();
    };

    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, using defaults");
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config file unusable, using defaults");
            TomlConfig::default()
        }
    }
}

/// Write a TOML config file, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Resolve the data folder: ENV, then TOML, then OS default
pub fn resolve_data_folder(config: &TomlConfig) -> PathBuf {
    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("flatquote"))
        .unwrap_or_else(|| PathBuf::from("./flatquote_data"))
}

/// Database file inside a data folder
pub fn database_path(data_folder: &Path) -> PathBuf {
    data_folder.join(DATABASE_FILE_NAME)
}
