// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for envman-rs.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. envman.toml (cwd)
//! 3. --config FILE (repeatable)
//! 4. ENVMAN_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! ENVMAN_BACKUP_KEEP=20              → backup.keep = 20
//! ENVMAN_BACKUP_DIRECTORY=D:\backup  → backup.directory = "D:\backup"
//! ```

pub mod loader;


use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Engine tuning.
    pub engine: EngineConfig,
    /// Backup collaborator options.
    pub backup: BackupConfig,
}

/// Global options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Console log level (0-5).
    pub log_level: u8,
    /// File log level (0-5); falls back to `log_level`.
    pub file_log_level: Option<u8>,
    /// Log file path; no file logging when unset.
    pub log_file: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: 3,
            file_log_level: None,
            log_file: None,
        }
    }
}

/// Engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum age of a cached scope snapshot, in seconds.
    pub cache_ttl_secs: u64,
    /// Bound of the operation history ring.
    pub history_capacity: usize,
    /// Timeout for the environment-change broadcast, in milliseconds.
    pub broadcast_timeout_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30,
            history_capacity: 100,
            broadcast_timeout_ms: 3000,
        }
    }
}

/// Backup collaborator options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    /// Snapshot directory; defaults to `<home>/.envman/backups`.
    pub directory: Option<String>,
    /// Number of backups kept before the oldest is evicted (0 = unlimited).
    pub keep: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: None,
            keep: 10,
        }
    }
}

impl Config {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or does not match the `Config` structure.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match
    /// the `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// The cache TTL as a [`Duration`].
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.engine.cache_ttl_secs)
    }

    /// The resolved backup directory.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.backup.directory.as_ref().map_or_else(
            || home_dir().join(".envman").join("backups"),
            PathBuf::from,
        )
    }

    /// Validates ranges after deserialization.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if self.global.log_level > 5 {
            return Err(ConfigError::InvalidValue {
                section: "global".to_string(),
                key: "log_level".to_string(),
                message: format!("log level must be 0-5, got {}", self.global.log_level),
            }
            .into());
        }
        if let Some(level) = self.global.file_log_level
            && level > 5
        {
            return Err(ConfigError::InvalidValue {
                section: "global".to_string(),
                key: "file_log_level".to_string(),
                message: format!("log level must be 0-5, got {level}"),
            }
            .into());
        }
        if self.engine.cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                section: "engine".to_string(),
                key: "cache_ttl_secs".to_string(),
                message: "cache TTL must be at least 1 second".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// The user's home directory, from the platform's conventional variable.
fn home_dir() -> PathBuf {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
}
