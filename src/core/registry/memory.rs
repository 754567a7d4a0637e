// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory registry store.
//!
//! The portable backend: test double on every platform, process-local
//! fallback where the Windows registry is unavailable. Mirrors the real
//! store's contract, including the per-call elevation check for machine
//! scope and the case-insensitive value names of the Windows registry.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{ChangeNotifier, NoopNotifier, RegistryStore, broadcast};
use crate::core::variable::Scope;
use crate::error::{EnvResult, NotifyError, RegistryError};

#[derive(Debug, Default)]
struct Tables {
    machine: BTreeMap<String, String>,
    user: BTreeMap<String, String>,
}

impl Tables {
    fn table(&self, scope: Scope) -> &BTreeMap<String, String> {
        match scope {
            Scope::Machine => &self.machine,
            Scope::User => &self.user,
        }
    }

    fn table_mut(&mut self, scope: Scope) -> &mut BTreeMap<String, String> {
        match scope {
            Scope::Machine => &mut self.machine,
            Scope::User => &mut self.user,
        }
    }
}

/// Finds the stored key matching `name` case-insensitively.
fn find_key(table: &BTreeMap<String, String>, name: &str) -> Option<String> {
    table
        .keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .cloned()
}

/// In-memory [`RegistryStore`] with a settable elevation flag.
pub struct MemoryRegistry {
    tables: Mutex<Tables>,
    elevated: AtomicBool,
    notifier: Arc<dyn ChangeNotifier>,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRegistry {
    /// Creates an empty store, elevated, with a no-op notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(NoopNotifier))
    }

    /// Creates an empty store with a custom notifier.
    #[must_use]
    pub fn with_notifier(notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            elevated: AtomicBool::new(true),
            notifier,
        }
    }

    /// Creates a store whose user scope is seeded from the process
    /// environment. The non-Windows development backend.
    #[must_use]
    pub fn from_process_env() -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.lock().expect("registry tables poisoned");
            for (name, value) in std::env::vars() {
                tables.user.insert(name, value);
            }
        }
        store
    }

    /// Sets the elevation flag consulted by machine-scope mutations.
    pub fn set_elevated(&self, elevated: bool) {
        self.elevated.store(elevated, Ordering::Relaxed);
    }

    fn check_elevation(&self, scope: Scope) -> EnvResult<()> {
        if scope == Scope::Machine && !self.elevated.load(Ordering::Relaxed) {
            return Err(RegistryError::PermissionDenied { scope }.into());
        }
        Ok(())
    }
}

impl RegistryStore for MemoryRegistry {
    fn list(&self, scope: Scope) -> EnvResult<BTreeMap<String, String>> {
        let tables = self.tables.lock().expect("registry tables poisoned");
        Ok(tables.table(scope).clone())
    }

    fn get(&self, name: &str, scope: Scope) -> EnvResult<Option<String>> {
        let tables = self.tables.lock().expect("registry tables poisoned");
        let table = tables.table(scope);
        Ok(find_key(table, name).and_then(|k| table.get(&k).cloned()))
    }

    fn set(&self, name: &str, value: &str, scope: Scope) -> EnvResult<()> {
        self.check_elevation(scope)?;
        {
            let mut tables = self.tables.lock().expect("registry tables poisoned");
            let table = tables.table_mut(scope);
            // Preserve the stored casing of an existing name, as the
            // Windows registry does.
            let key = find_key(table, name).unwrap_or_else(|| name.to_string());
            table.insert(key, value.to_string());
        }
        broadcast(self.notifier.as_ref());
        Ok(())
    }

    fn delete(&self, name: &str, scope: Scope) -> EnvResult<()> {
        self.check_elevation(scope)?;
        let removed = {
            let mut tables = self.tables.lock().expect("registry tables poisoned");
            let table = tables.table_mut(scope);
            find_key(table, name).is_some_and(|k| table.remove(&k).is_some())
        };
        if removed {
            broadcast(self.notifier.as_ref());
        }
        Ok(())
    }

    fn import_scope(
        &self,
        scope: Scope,
        entries: &[(String, String)],
        replace: bool,
    ) -> EnvResult<()> {
        self.check_elevation(scope)?;
        {
            let mut tables = self.tables.lock().expect("registry tables poisoned");
            let table = tables.table_mut(scope);
            if replace {
                table.clear();
            }
            for (name, value) in entries {
                let key = find_key(table, name).unwrap_or_else(|| name.clone());
                table.insert(key, value.clone());
            }
        }
        broadcast(self.notifier.as_ref());
        Ok(())
    }
}

/// Notifier that counts deliveries. Test instrumentation.
#[derive(Debug, Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
}

impl CountingNotifier {
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl ChangeNotifier for CountingNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Notifier that always times out. Exercises the swallow-and-log path.
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl ChangeNotifier for FailingNotifier {
    fn notify(&self) -> Result<(), NotifyError> {
        Err(NotifyError::Timeout { timeout_ms: 0 })
    }
}
