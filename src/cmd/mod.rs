// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command handlers.
//!
//! ```text
//! env     list / get / set / delete / search
//! path    show / add / remove / dedupe / clean / optimize / stats
//! backup  create / list / restore / delete
//!
//! Handlers consume the engine only; the store is opened once per
//! invocation and shared behind an Arc.
//! ```

pub mod backup;
pub mod env;
pub mod path;

use std::sync::Arc;

use crate::config::Config;
use crate::core::manager::VariableManager;
use crate::core::registry::RegistryStore;
use crate::core::variable::{Scope, Variable};
use crate::error::Result;

/// Opens the platform's registry store.
#[cfg(windows)]
pub(crate) fn open_store(config: &Config) -> Arc<dyn RegistryStore> {
    use crate::core::registry::windows::WindowsRegistry;
    Arc::new(WindowsRegistry::new(config.engine.broadcast_timeout_ms))
}

/// Opens the process-local fallback store.
///
/// Off Windows there is no machine/user registry; a memory store seeded
/// from the process environment keeps the tool demonstrable.
#[cfg(not(windows))]
pub(crate) fn open_store(config: &Config) -> Arc<dyn RegistryStore> {
    use crate::core::registry::memory::MemoryRegistry;
    let _ = config;
    Arc::new(MemoryRegistry::from_process_env())
}

/// Builds the engine over a store with the configured tuning.
pub(crate) fn build_manager(config: &Config, store: Arc<dyn RegistryStore>) -> VariableManager {
    VariableManager::new(store)
        .with_ttl(config.cache_ttl())
        .with_history_capacity(config.engine.history_capacity)
}

/// Case-insensitive lookup of one variable in one scope.
pub(crate) fn find_variable(
    manager: &VariableManager,
    name: &str,
    scope: Scope,
) -> Result<Option<Variable>> {
    let vars = manager.get_by_scope(scope)?;
    Ok(vars.into_iter().find(|v| v.name().eq_ignore_ascii_case(name)))
}

/// Prints advisory warnings; refuses to proceed without `--yes`.
pub(crate) fn confirm_warnings(warnings: &[String], yes: bool) -> Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
    if yes {
        return Ok(());
    }
    Err(anyhow::anyhow!(
        "change raises {} warning(s); re-run with --yes to proceed",
        warnings.len()
    ))
}
