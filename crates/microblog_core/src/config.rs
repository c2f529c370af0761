//! Store configuration.
//!
//! # Responsibility
//! - Describe which database to open and how to log.
//! - Load settings from serialized config or process environment.
//!
//! # Invariants
//! - A missing database setting means an in-memory store.
//! - Log options are only applied when `log_dir` is set.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming the database file.
pub const ENV_DB_PATH: &str = "MICROBLOG_DB_PATH";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "MICROBLOG_LOG_LEVEL";
/// Environment variable naming the absolute log directory.
pub const ENV_LOG_DIR: &str = "MICROBLOG_LOG_DIR";

/// Where the store keeps its tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseTarget {
    /// Throwaway database living as long as the connection.
    #[default]
    Memory,
    /// SQLite database file, created on first open.
    File(PathBuf),
}

/// Top-level settings for opening a store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database: DatabaseTarget,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseTarget::Memory,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Builds a config from `MICROBLOG_*` environment variables.
    ///
    /// Unset or blank variables fall back to [`StoreConfig::default`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.database = DatabaseTarget::File(PathBuf::from(path.trim()));
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level.trim().to_string();
        }
        config.log_dir = non_blank(ENV_LOG_DIR).map(|dir| dir.trim().to_string());
        config
    }
}
