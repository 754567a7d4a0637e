// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the registry store contract, via the in-memory backend.

use std::sync::Arc;

use super::RegistryStore;
use super::memory::{CountingNotifier, FailingNotifier, MemoryRegistry};
use crate::core::variable::Scope;
use crate::error::{EnvError, RegistryError};

#[test]
fn test_set_get_roundtrip() {
    let store = MemoryRegistry::new();
    store.set("EDITOR", "vim", Scope::User).unwrap();

    assert_eq!(
        store.get("EDITOR", Scope::User).unwrap().as_deref(),
        Some("vim")
    );
    assert_eq!(store.get("EDITOR", Scope::Machine).unwrap(), None);
}

#[test]
fn test_get_is_case_insensitive() {
    let store = MemoryRegistry::new();
    store.set("Path", r"C:\Tools", Scope::User).unwrap();

    assert_eq!(
        store.get("PATH", Scope::User).unwrap().as_deref(),
        Some(r"C:\Tools")
    );
    assert!(store.exists("path", Scope::User).unwrap());
}

#[test]
fn test_set_preserves_stored_casing() {
    let store = MemoryRegistry::new();
    store.set("Path", "a", Scope::User).unwrap();
    store.set("PATH", "b", Scope::User).unwrap();

    let table = store.list(Scope::User).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("Path").map(String::as_str), Some("b"));
}

#[test]
fn test_machine_set_requires_elevation() {
    let store = MemoryRegistry::new();
    store.set_elevated(false);

    let err = store.set("EDITOR", "vim", Scope::Machine).unwrap_err();
    assert!(matches!(
        err,
        EnvError::Registry(e) if matches!(*e, RegistryError::PermissionDenied { scope: Scope::Machine })
    ));
    // The table is unchanged.
    assert!(store.list(Scope::Machine).unwrap().is_empty());

    // User scope stays writable without elevation.
    store.set("EDITOR", "vim", Scope::User).unwrap();
}

#[test]
fn test_delete_missing_is_success() {
    let store = MemoryRegistry::new();
    store.delete("NEVER_EXISTED", Scope::User).unwrap();
}

#[test]
fn test_broadcast_fires_per_mutation() {
    let notifier = Arc::new(CountingNotifier::default());
    let store = MemoryRegistry::with_notifier(notifier.clone());

    store.set("A", "1", Scope::User).unwrap();
    store.set("A", "2", Scope::User).unwrap();
    store.delete("A", Scope::User).unwrap();
    assert_eq!(notifier.count(), 3);

    // A no-op delete is not a mutation and does not broadcast.
    store.delete("A", Scope::User).unwrap();
    assert_eq!(notifier.count(), 3);

    // Reads never broadcast.
    let _ = store.list(Scope::User).unwrap();
    let _ = store.get("A", Scope::User).unwrap();
    assert_eq!(notifier.count(), 3);
}

#[test]
fn test_broadcast_failure_never_fails_the_mutation() {
    let store = MemoryRegistry::with_notifier(Arc::new(FailingNotifier));

    store.set("EDITOR", "vim", Scope::User).unwrap();
    assert_eq!(
        store.get("EDITOR", Scope::User).unwrap().as_deref(),
        Some("vim")
    );
    store.delete("EDITOR", Scope::User).unwrap();
}

#[test]
fn test_export_import_roundtrip() {
    let source = MemoryRegistry::new();
    source.set("A", "1", Scope::User).unwrap();
    source.set("B", "2", Scope::User).unwrap();

    let exported = source.export_scope(Scope::User).unwrap();
    assert_eq!(exported.len(), 2);

    let target = MemoryRegistry::new();
    target.set("STALE", "x", Scope::User).unwrap();
    target.import_scope(Scope::User, &exported, true).unwrap();

    let table = target.list(Scope::User).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("A").map(String::as_str), Some("1"));
    assert!(!table.contains_key("STALE"));
}

#[test]
fn test_import_without_replace_merges() {
    let store = MemoryRegistry::new();
    store.set("KEEP", "1", Scope::User).unwrap();

    store
        .import_scope(Scope::User, &[("NEW".to_string(), "2".to_string())], false)
        .unwrap();

    let table = store.list(Scope::User).unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn test_import_respects_elevation() {
    let store = MemoryRegistry::new();
    store.set_elevated(false);

    let err = store
        .import_scope(Scope::Machine, &[("A".to_string(), "1".to_string())], false)
        .unwrap_err();
    assert!(matches!(err, EnvError::Registry(_)));
}

#[test]
fn test_scopes_are_isolated() {
    let store = MemoryRegistry::new();
    store.set("SHARED", "machine", Scope::Machine).unwrap();
    store.set("SHARED", "user", Scope::User).unwrap();

    assert_eq!(
        store.get("SHARED", Scope::Machine).unwrap().as_deref(),
        Some("machine")
    );
    assert_eq!(
        store.get("SHARED", Scope::User).unwrap().as_deref(),
        Some("user")
    );

    store.delete("SHARED", Scope::User).unwrap();
    assert!(store.exists("SHARED", Scope::Machine).unwrap());
}
