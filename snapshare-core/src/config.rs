//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RETENTION_DAYS};
use crate::error::{SnapError, SnapResult};
use crate::event::RetentionDays;
use crate::links::LinkBuilder;
use crate::storage::FileStorage;
use crate::store::EventStore;

static DEFAULT_DATA_DIR: &str = "~/.local/share/snapshare";

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("snapshare"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

/// Configuration at ~/.config/snapshare/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Where event records are stored, one JSON file per event.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Origin the upload and gallery links are built on.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Retention used when `create` isn't given one.
    #[serde(default = "default_retention_days")]
    pub default_retention_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: default_data_dir(),
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            default_retention_days: default_retention_days(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> SnapResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SnapError::Config("Could not determine config directory".into()))?
            .join("snapshare");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template there
    /// first if nothing exists yet.
    pub fn load() -> SnapResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> SnapResult<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| SnapError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SnapError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SnapResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(SnapError::Config("poll_interval_ms must be greater than 0".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(SnapError::Config("base_url must not be empty".into()));
        }
        self.default_retention()?;
        Ok(())
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn default_retention(&self) -> SnapResult<RetentionDays> {
        RetentionDays::try_from(self.default_retention_days)
            .map_err(|e| SnapError::Config(format!("default_retention_days: {e}")))
    }

    /// The file-backed event store this configuration describes.
    pub fn open_store(&self) -> EventStore {
        EventStore::new(FileStorage::new(self.data_path()))
            .with_links(LinkBuilder::new(self.base_url.clone()))
    }

    /// Validate and write to `path`, replacing the file in one rename.
    pub fn save(&self, path: &Path) -> SnapResult<()> {
        self.validate()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| SnapError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SnapError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        let temp = path.with_extension("toml.tmp");
        std::fs::write(&temp, content)
            .map_err(|e| SnapError::Config(format!("Could not write config file: {e}")))?;
        std::fs::rename(&temp, path)
            .map_err(|e| SnapError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SnapResult<()> {
        let contents = format!(
            "\
# snapshare configuration

# Where event records are stored:
# data_dir = \"{}\"

# Origin used for upload and gallery links:
# base_url = \"{}\"

# How often galleries refresh, in milliseconds:
# poll_interval_ms = {}

# Retention for new events (1, 3, 7, 14 or 30 days):
# default_retention_days = {}
",
            DEFAULT_DATA_DIR, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RETENTION_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SnapError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SnapError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
