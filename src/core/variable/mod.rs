// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment variable data model.
//!
//! ```text
//! Scope: Machine (HKLM) | User (HKCU)
//! Variable: name/value + original_value + dirty flags
//!   identity = (UPPER(name), scope)
//!   MODIFIED set iff value != original_value
//! OperationRecord: Create | Update | Delete + outcome
//! ChangeEvent: Created | Updated | Deleted + old value
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Which persistent table a variable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Machine-wide variables under
    /// `HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment`.
    Machine,
    /// Per-user variables under `HKCU\Environment`.
    User,
}

impl Scope {
    /// Both scopes, machine first.
    pub const ALL: [Self; 2] = [Self::Machine, Self::User];
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Machine => write!(f, "machine"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "machine" | "system" => Ok(Self::Machine),
            "user" => Ok(Self::User),
            other => Err(format!("unknown scope '{other}', expected 'machine' or 'user'")),
        }
    }
}

bitflags! {
    /// Dirty-state flags for a [`Variable`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VariableFlags: u8 {
        /// Created in memory, not yet persisted.
        const NEW = 1;
        /// `value` differs from `original_value`.
        const MODIFIED = 1 << 1;
        /// Deleted from the store.
        const DELETED = 1 << 2;
    }
}

/// An environment variable in one of the two scopes.
///
/// Identity is `(name upper-cased, scope)`; two variables with names
/// differing only in case are the same variable, as on Windows.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    value: String,
    scope: Scope,
    original_value: String,
    created_at: SystemTime,
    modified_at: Option<SystemTime>,
    flags: VariableFlags,
}

impl Variable {
    /// Creates a new, not-yet-persisted variable.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, scope: Scope) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            original_value: value.clone(),
            value,
            scope,
            created_at: SystemTime::now(),
            modified_at: None,
            flags: VariableFlags::NEW,
        }
    }

    /// Reconstructs a persisted variable from a store read.
    #[must_use]
    pub fn from_store(name: impl Into<String>, value: impl Into<String>, scope: Scope) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            original_value: value.clone(),
            value,
            scope,
            created_at: SystemTime::now(),
            modified_at: None,
            flags: VariableFlags::empty(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    #[must_use]
    pub fn original_value(&self) -> &str {
        &self.original_value
    }

    #[must_use]
    pub const fn created_at(&self) -> SystemTime {
        self.created_at
    }

    #[must_use]
    pub const fn modified_at(&self) -> Option<SystemTime> {
        self.modified_at
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.flags.contains(VariableFlags::NEW)
    }

    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.flags.contains(VariableFlags::MODIFIED)
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.flags.contains(VariableFlags::DELETED)
    }

    /// The `(upper-cased name, scope)` identity pair.
    #[must_use]
    pub fn identity(&self) -> (String, Scope) {
        (self.name.to_uppercase(), self.scope)
    }

    /// Replaces the value and re-derives the `MODIFIED` flag.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.mark_modified();
    }

    /// Re-derives `MODIFIED` from `value != original_value`.
    pub fn mark_modified(&mut self) {
        if self.value == self.original_value {
            self.flags.remove(VariableFlags::MODIFIED);
            self.modified_at = None;
        } else {
            self.flags.insert(VariableFlags::MODIFIED);
            self.modified_at = Some(SystemTime::now());
        }
    }

    /// Commits the pending value after a successful store write.
    ///
    /// `original_value` becomes the current value and `NEW`/`MODIFIED` clear.
    pub fn apply_changes(&mut self) {
        self.original_value = self.value.clone();
        self.flags.remove(VariableFlags::NEW | VariableFlags::MODIFIED);
    }

    /// Discards the pending value, restoring `original_value`.
    pub fn reset_changes(&mut self) {
        self.value = self.original_value.clone();
        self.flags.remove(VariableFlags::MODIFIED);
        self.modified_at = None;
    }

    /// Marks the variable as deleted after a successful store delete.
    pub fn mark_deleted(&mut self) {
        self.flags.insert(VariableFlags::DELETED);
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.to_uppercase().hash(state);
        self.scope.hash(state);
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} variable {}={}", self.scope, self.name, self.value)
    }
}

/// Kind of a persisted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Result of a recorded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(String),
}

/// Immutable history entry owned by the variable manager.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub kind: OperationKind,
    /// Snapshot of the variable at the time of the operation.
    pub variable: Variable,
    pub previous_value: Option<String>,
    pub timestamp: SystemTime,
    pub outcome: Outcome,
}

impl OperationRecord {
    #[must_use]
    pub fn success(kind: OperationKind, variable: Variable, previous_value: Option<String>) -> Self {
        Self {
            kind,
            variable,
            previous_value,
            timestamp: SystemTime::now(),
            outcome: Outcome::Success,
        }
    }

    #[must_use]
    pub fn failed(
        kind: OperationKind,
        variable: Variable,
        previous_value: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            variable,
            previous_value,
            timestamp: SystemTime::now(),
            outcome: Outcome::Failed(reason.into()),
        }
    }
}

/// Kind of a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Event published synchronously to subscribers after a successful mutation.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub variable: Variable,
    pub old_value: Option<String>,
}
