//! TOML-based application configuration.
//!
//! Read from `study.toml` in the working directory, or from the file named by
//! the `STUDY_CONFIG` environment variable. A missing file means defaults.

use crate::models::QueueMode;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "STUDY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "study.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where "today" comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Local calendar date
    #[default]
    System,
    /// Date stored in the database, advanced by hand
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Owner of the review states written by this install
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// env_logger filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub clock: ClockMode,
    #[serde(default)]
    pub queue: QueueMode,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("study.sqlite3")
}
fn default_user_id() -> String {
    "local".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            user_id: default_user_id(),
            log_level: default_log_level(),
            clock: ClockMode::default(),
            queue: QueueMode::default(),
        }
    }
}

impl Config {
    /// Path of the config file: `$STUDY_CONFIG` or `study.toml`.
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Loads the config; a missing file yields defaults, a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The local calendar date; simulated clocks are resolved by the caller
    /// against the database.
    pub fn system_today() -> NaiveDate {
        Local::now().date_naive()
    }
}
