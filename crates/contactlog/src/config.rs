//! Configuration management for contactlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::fmt;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::location::Place;
use crate::store::DEFAULT_SLOT_KEY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "contactlog";

/// Default database file name for the `SQLite` backend.
const DATABASE_FILE_NAME: &str = "contactlog.db";

/// Characters allowed in a slot key.
const SLOT_KEY_PATTERN: &str = r"^[A-Za-z0-9._-]+$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CONTACTLOG_`)
/// 2. TOML config file at `~/.config/contactlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Time and place tagging configuration.
    pub tagging: TaggingConfig,
}

/// Which slot backend holds the contact list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per slot in a data directory.
    #[default]
    File,
    /// A key/value table in a `SQLite` database.
    Sqlite,
    /// Process memory only; nothing survives exit.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to use.
    pub backend: BackendKind,
    /// Directory (file backend) or database file (sqlite backend).
    /// Defaults to a location under `~/.local/share/contactlog/`.
    pub path: Option<PathBuf>,
    /// Name of the slot holding the contact list.
    pub key: String,
}

/// Tagging-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingConfig {
    /// `strftime` format for the capture time.
    pub time_format: String,
    /// Location recorded when no place can be resolved.
    pub fallback_location: String,
    /// Fixed place to tag new contacts with, if any.
    pub place: Option<Place>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            path: None, // Will be resolved to default at runtime
            key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            time_format: "%I:%M %p".to_string(),
            fallback_location: "Unknown".to_string(),
            place: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `CONTACTLOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("CONTACTLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let key_pattern = regex::Regex::new(SLOT_KEY_PATTERN)
            .map_err(|e| Error::internal(format!("slot key pattern: {e}")))?;
        if !key_pattern.is_match(&self.storage.key) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "storage key '{}' must be non-empty and contain only letters, digits, '.', '-' or '_'",
                    self.storage.key
                ),
            });
        }

        if self.tagging.time_format.is_empty() {
            return Err(Error::ConfigValidation {
                message: "time_format must not be empty".to_string(),
            });
        }

        if StrftimeItems::new(&self.tagging.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::ConfigValidation {
                message: format!("invalid time_format: {}", self.tagging.time_format),
            });
        }

        if self.tagging.fallback_location.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "fallback_location must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the storage path for the configured backend, resolving defaults
    /// if not set.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return path.clone();
        }
        match self.storage.backend {
            BackendKind::File => Self::default_data_dir(),
            BackendKind::Sqlite => Self::default_data_dir().join(DATABASE_FILE_NAME),
            BackendKind::Memory => PathBuf::from(":memory:"),
        }
    }
}
