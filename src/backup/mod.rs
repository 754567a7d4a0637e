// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Backup and restore of whole scopes as JSON snapshots.
//!
//! ```text
//! BackupManager { store, dir, keep }
//!   create   store.list(scope) per scope -> <id>.json
//!            retention: oldest beyond `keep` deleted
//!   list     newest first
//!   restore  store.import_scope per scope, failures in report
//!   delete   remove snapshot file
//!
//! Bulk pass-through: no validator involvement either way.
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::registry::RegistryStore;
use crate::core::variable::Scope;
use crate::error::{BackupError, EnvResult};

/// Default number of backups kept before the oldest is evicted.
pub const DEFAULT_BACKUP_KEEP: usize = 10;

/// Metadata describing one stored backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: SystemTime,
    pub variable_count: usize,
    pub scopes: Vec<Scope>,
}

/// On-disk snapshot: metadata plus the raw name/value pairs per scope.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    #[serde(flatten)]
    info: BackupInfo,
    entries: BTreeMap<Scope, Vec<(String, String)>>,
}

/// Per-scope outcome of a restore.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Variables written back successfully.
    pub restored: usize,
    /// Scopes the store rejected, with the error text.
    pub failures: Vec<(Scope, String)>,
}

impl RestoreReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Snapshot/restore collaborator over the store's bulk primitives.
pub struct BackupManager {
    store: Arc<dyn RegistryStore>,
    dir: PathBuf,
    keep: usize,
}

impl BackupManager {
    #[must_use]
    pub fn new(store: Arc<dyn RegistryStore>, dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            dir: dir.into(),
            keep: DEFAULT_BACKUP_KEEP,
        }
    }

    /// Sets the retention cap (0 disables eviction).
    #[must_use]
    pub const fn with_keep(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    fn snapshot_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Snapshots the given scopes into a new backup file.
    ///
    /// # Errors
    ///
    /// Propagates store access errors; returns a [`BackupError`] when the
    /// snapshot file cannot be written.
    pub fn create(
        &self,
        name: Option<&str>,
        description: Option<&str>,
        scopes: &[Scope],
    ) -> EnvResult<BackupInfo> {
        let created_at = SystemTime::now();
        let id = derive_id(created_at);

        let mut entries = BTreeMap::new();
        let mut variable_count = 0;
        for &scope in scopes {
            let pairs = self.store.export_scope(scope)?;
            variable_count += pairs.len();
            entries.insert(scope, pairs);
        }

        let info = BackupInfo {
            id: id.clone(),
            name: name.map_or_else(|| id.clone(), str::to_string),
            description: description.map(str::to_string),
            created_at,
            variable_count,
            scopes: scopes.to_vec(),
        };

        std::fs::create_dir_all(&self.dir).map_err(|source| BackupError::WriteError {
            path: self.dir.display().to_string(),
            source,
        })?;
        let path = self.snapshot_path(&id);
        let snapshot = Snapshot {
            info: info.clone(),
            entries,
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| BackupError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|source| BackupError::WriteError {
            path: path.display().to_string(),
            source,
        })?;

        self.enforce_retention()?;
        tracing::info!("created backup '{}' ({} variables)", info.name, variable_count);
        Ok(info)
    }

    /// All backups, newest first. Unreadable snapshot files are skipped
    /// with a warning so one corrupt file cannot hide the rest.
    ///
    /// # Errors
    ///
    /// Returns a [`BackupError`] if the backup directory cannot be read.
    pub fn list(&self) -> EnvResult<Vec<BackupInfo>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let dir = std::fs::read_dir(&self.dir).map_err(|source| BackupError::ReadError {
            path: self.dir.display().to_string(),
            source,
        })?;

        let mut infos = Vec::new();
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            match read_snapshot(&path) {
                Ok(snapshot) => infos.push(snapshot.info),
                Err(e) => tracing::warn!("skipping unreadable backup {}: {e}", path.display()),
            }
        }
        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(infos)
    }

    /// Restores a backup through the store's bulk import.
    ///
    /// Per-scope store failures end up in the report rather than aborting
    /// the remaining scopes.
    ///
    /// # Errors
    ///
    /// Returns a [`BackupError`] when the snapshot is missing or corrupt.
    pub fn restore(&self, id: &str, replace: bool) -> EnvResult<RestoreReport> {
        let path = self.snapshot_path(id);
        if !path.exists() {
            return Err(BackupError::NotFound(id.to_string()).into());
        }
        let snapshot = read_snapshot(&path)?;

        let mut report = RestoreReport::default();
        for (scope, pairs) in &snapshot.entries {
            match self.store.import_scope(*scope, pairs, replace) {
                Ok(()) => report.restored += pairs.len(),
                Err(e) => report.failures.push((*scope, e.to_string())),
            }
        }
        Ok(report)
    }

    /// Deletes a backup file.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::NotFound`] for unknown ids.
    pub fn delete(&self, id: &str) -> EnvResult<()> {
        let path = self.snapshot_path(id);
        if !path.exists() {
            return Err(BackupError::NotFound(id.to_string()).into());
        }
        std::fs::remove_file(&path).map_err(|source| BackupError::WriteError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }

    fn enforce_retention(&self) -> EnvResult<()> {
        if self.keep == 0 {
            return Ok(());
        }
        let infos = self.list()?;
        for stale in infos.iter().skip(self.keep) {
            tracing::info!("retention: dropping old backup '{}'", stale.id);
            self.delete(&stale.id)?;
        }
        Ok(())
    }
}

fn derive_id(created_at: SystemTime) -> String {
    let since_epoch = created_at
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}-{:09}", since_epoch.as_secs(), since_epoch.subsec_nanos())
}

fn read_snapshot(path: &Path) -> EnvResult<Snapshot> {
    let json = std::fs::read_to_string(path).map_err(|source| BackupError::ReadError {
        path: path.display().to_string(),
        source,
    })?;
    let snapshot = serde_json::from_str(&json).map_err(|e| BackupError::Corrupt {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(snapshot)
}
