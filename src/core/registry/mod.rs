// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scope-aware persistent store for environment variables.
//!
//! ```text
//! RegistryStore (trait)
//!   list / get / exists / set / delete
//!   export_scope / import_scope (bulk, backup only)
//!        |
//!   +----+--------------------+
//!   v                         v
//! WindowsRegistry        MemoryRegistry
//! HKLM / HKCU keys       Mutex<BTreeMap> per scope
//! elevation per call     settable elevated flag
//!        |
//!        v
//! ChangeNotifier::notify()
//!   WM_SETTINGCHANGE broadcast, best-effort:
//!   failure is logged, never fails the mutation
//! ```

pub mod memory;

#[cfg(windows)]
pub mod windows;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use crate::core::variable::Scope;
use crate::error::{EnvResult, NotifyError};

/// Registry subkey holding machine-scope variables (under HKLM).
pub const MACHINE_ENV_SUBKEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// Registry subkey holding user-scope variables (under HKCU).
pub const USER_ENV_SUBKEY: &str = "Environment";

/// Best-effort "environment changed" signal to the running session.
///
/// Addressed broadly, carries no payload. Implementations must bound their
/// own execution time; callers discard the result after logging.
pub trait ChangeNotifier: Send + Sync {
    /// Signals that environment state changed.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] on failure or timeout. The caller logs and
    /// discards it; the persisted mutation is never rolled back.
    fn notify(&self) -> Result<(), NotifyError>;
}

/// Notifier that does nothing. Used off Windows and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Logs and discards a broadcast result after a successful mutation.
pub(crate) fn broadcast(notifier: &dyn ChangeNotifier) {
    if let Err(e) = notifier.notify() {
        tracing::warn!("environment change broadcast dropped: {e}");
    }
}

/// Raw, scope-aware key/value access to the two persistent variable tables.
///
/// Implementations check the privilege signal lazily at the point of each
/// machine-scope mutation and fire the change broadcast after every
/// successful `set`/`delete`/`import_scope` before returning.
pub trait RegistryStore: Send + Sync {
    /// Enumerates all entries for a scope.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Access`](crate::error::RegistryError::Access)
    /// if the underlying key cannot be opened.
    fn list(&self, scope: Scope) -> EnvResult<BTreeMap<String, String>>;

    /// Reads a single entry. Absence is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an access error if the underlying key cannot be opened.
    fn get(&self, name: &str, scope: Scope) -> EnvResult<Option<String>>;

    /// Whether an entry with this name exists in the scope.
    ///
    /// # Errors
    ///
    /// Returns an access error if the underlying key cannot be opened.
    fn exists(&self, name: &str, scope: Scope) -> EnvResult<bool> {
        Ok(self.get(name, scope)?.is_some())
    }

    /// Writes a single entry, then broadcasts.
    ///
    /// # Errors
    ///
    /// Returns a permission error for machine-scope writes without
    /// elevation, or an access error on store failure.
    fn set(&self, name: &str, value: &str, scope: Scope) -> EnvResult<()>;

    /// Deletes a single entry, then broadcasts. Missing entries are success.
    ///
    /// # Errors
    ///
    /// Returns a permission error for machine-scope deletes without
    /// elevation, or an access error on any other store failure.
    fn delete(&self, name: &str, scope: Scope) -> EnvResult<()>;

    /// Bulk snapshot of a whole scope, for the backup collaborator.
    ///
    /// # Errors
    ///
    /// Returns an access error if the underlying key cannot be opened.
    fn export_scope(&self, scope: Scope) -> EnvResult<Vec<(String, String)>> {
        Ok(self.list(scope)?.into_iter().collect())
    }

    /// Bulk restore into a scope, for the backup collaborator.
    ///
    /// Does not route through the validator. With `replace`, entries not in
    /// the snapshot are removed first. Broadcasts once at the end.
    ///
    /// # Errors
    ///
    /// Returns a permission error for machine scope without elevation, or an
    /// access error on store failure.
    fn import_scope(&self, scope: Scope, entries: &[(String, String)], replace: bool)
    -> EnvResult<()>;
}
