// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              EnvError (~24 bytes)
//!                     |
//!   +---------+-------+-------+---------+
//!   |     |       |       |       |     |
//!   v     v       v       v       v     v
//! Valid  Reg    Mgr     Backup   Cfg  Io/Other
//!  Box   Box    Box      Box     Box  Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Validation  per-rule variants (name, value, list structure)
//!   Registry    Access, PermissionDenied
//!   Manager     NotFound, AlreadyExists
//!   Backup      NotFound, ReadError, WriteError, Corrupt
//!   Config      ParseError, MissingKey, InvalidValue
//!
//! All variants boxed => EnvError fits in 24 bytes.
//! NotifyError is deliberately absent: broadcast failures
//! are logged by the store and never surface to callers.
//! ```

use thiserror::Error;

use crate::core::variable::Scope;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`EnvError`].
pub type EnvResult<T> = std::result::Result<T, EnvError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A name, value, or list-structure rule was violated.
    #[error("validation error: {0}")]
    Validation(#[from] Box<ValidationError>),

    /// The persistent store rejected or failed an operation.
    #[error("registry error: {0}")]
    Registry(#[from] Box<RegistryError>),

    /// Identity-level failure in the variable manager.
    #[error("{0}")]
    Manager(#[from] Box<ManagerError>),

    /// Backup snapshot failure.
    #[error("backup error: {0}")]
    Backup(#[from] Box<BackupError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for EnvError {
                fn from(err: $error) -> Self {
                    EnvError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ValidationError => Validation,
    RegistryError => Registry,
    ManagerError => Manager,
    BackupError => Backup,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Validation Errors ---

/// Rule violations reported by the validator and the path list engine.
///
/// Always recoverable: the message names the specific rule that failed.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Variable name is empty.
    #[error("variable name must not be empty")]
    EmptyName,

    /// Variable name exceeds the 255-character limit.
    #[error("variable name is {len} characters, maximum is {max}")]
    NameTooLong { len: usize, max: usize },

    /// Variable name does not match `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid variable name '{name}': must start with a letter or underscore and contain only letters, digits, and underscores")]
    BadGrammar { name: String },

    /// Variable name contains a shell metacharacter.
    #[error("variable name '{name}' contains forbidden character '{ch}'")]
    IllegalNameCharacter { name: String, ch: char },

    /// Variable name contains an equals sign.
    #[error("variable name '{name}' must not contain '='")]
    EmbeddedEquals { name: String },

    /// The name is reserved by the operating system.
    #[error("'{name}' is a reserved variable and cannot be created, modified, or deleted")]
    ReservedName { name: String },

    /// Variable value exceeds the 32767-character limit.
    #[error("value is {len} characters, maximum is {max}")]
    ValueTooLong { len: usize, max: usize },

    /// A list element exceeds the per-entry length limit.
    #[error("path entry '{entry}' is {len} characters, maximum is {max}")]
    PathEntryTooLong {
        entry: String,
        len: usize,
        max: usize,
    },

    /// A list element contains a character forbidden in paths.
    #[error("path entry '{entry}' contains forbidden character '{ch}'")]
    PathEntryIllegalCharacter { entry: String, ch: char },

    /// Two batch members share the same `(name, scope)` identity.
    #[error("duplicate variable '{name}' ({scope}) in batch")]
    DuplicateIdentity { name: String, scope: Scope },
}

// --- Registry Errors ---

/// Persistent store failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The underlying key could not be opened, read, or written.
    #[error("cannot access {scope} environment key: {message}")]
    Access { scope: Scope, message: String },

    /// Machine-scope mutation attempted without elevation.
    #[error("modifying {scope} variables requires administrator privileges")]
    PermissionDenied { scope: Scope },
}

// --- Manager Errors ---

/// Identity-level failures in the variable manager.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Update or delete against a missing identity.
    #[error("variable '{name}' not found in {scope} scope")]
    NotFound { name: String, scope: Scope },

    /// Create against an existing identity.
    #[error("variable '{name}' already exists in {scope} scope")]
    AlreadyExists { name: String, scope: Scope },
}

// --- Backup Errors ---

/// Backup snapshot failures.
#[derive(Debug, Error)]
pub enum BackupError {
    /// No backup with the given id.
    #[error("backup '{0}' not found")]
    NotFound(String),

    /// Failed to read a snapshot file.
    #[error("failed to read backup '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a snapshot file.
    #[error("failed to write backup '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file is not valid JSON or has an unexpected shape.
    #[error("backup '{path}' is corrupt: {message}")]
    Corrupt { path: String, message: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Notifier Errors ---

/// Broadcast failures.
///
/// Never part of a public `Result`: the store logs these and discards them,
/// since the persisted mutation has already succeeded.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The broadcast did not complete within the configured timeout.
    #[error("environment change broadcast timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u32 },

    /// The broadcast call itself failed.
    #[error("environment change broadcast failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests;
