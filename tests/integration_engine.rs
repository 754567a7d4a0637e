// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the engine: manager + validator + store wired
//! together the way the binary wires them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use envman_rs::core::manager::VariableManager;
use envman_rs::core::registry::RegistryStore;
use envman_rs::core::registry::memory::{CountingNotifier, MemoryRegistry};
use envman_rs::core::variable::{ChangeKind, Scope, Variable};
use envman_rs::error::EnvError;

fn engine() -> (Arc<MemoryRegistry>, VariableManager) {
    let store = Arc::new(MemoryRegistry::new());
    let manager = VariableManager::new(store.clone()).with_ttl(Duration::from_secs(600));
    (store, manager)
}

#[test]
fn full_lifecycle_create_update_delete() {
    let (store, manager) = engine();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    manager.subscribe(move |event| sink.lock().unwrap().push(event.kind));

    manager.create("JAVA_HOME", r"C:\Java8", Scope::User).unwrap();

    let mut var = manager
        .get_by_scope(Scope::User)
        .unwrap()
        .into_iter()
        .find(|v| v.name() == "JAVA_HOME")
        .unwrap();
    assert!(!var.is_new());
    assert!(!var.is_modified());

    var.set_value(r"C:\Java17");
    assert!(var.is_modified());
    manager.update(&var).unwrap();
    assert_eq!(
        store.get("JAVA_HOME", Scope::User).unwrap().as_deref(),
        Some(r"C:\Java17")
    );

    manager.delete(&var).unwrap();
    assert!(!store.exists("JAVA_HOME", Scope::User).unwrap());

    assert_eq!(
        *events.lock().unwrap(),
        vec![ChangeKind::Created, ChangeKind::Updated, ChangeKind::Deleted]
    );
    assert_eq!(manager.get_history(None).len(), 3);
}

#[test]
fn unelevated_machine_mutation_is_rejected_end_to_end() {
    let (store, manager) = engine();
    store.set_elevated(false);

    let err = manager.create("COMPANY_KEY", "abc", Scope::Machine).unwrap_err();
    assert!(matches!(err, EnvError::Registry(_)));

    store.set_elevated(true);
    assert!(store.list(Scope::Machine).unwrap().is_empty());

    // The same create succeeds once elevated.
    manager.create("COMPANY_KEY", "abc", Scope::Machine).unwrap();
    assert!(store.exists("COMPANY_KEY", Scope::Machine).unwrap());
}

#[test]
fn reserved_names_cannot_be_touched() {
    let (store, manager) = engine();

    assert!(manager.create("WINDIR", r"D:\Win", Scope::User).is_err());

    let windir = Variable::from_store("SystemRoot", r"C:\Windows", Scope::Machine);
    assert!(manager.update(&windir).is_err());
    assert!(manager.delete(&windir).is_err());
    assert!(store.list(Scope::Machine).unwrap().is_empty());
}

#[test]
fn broadcast_accompanies_every_persisted_mutation() {
    let notifier = Arc::new(CountingNotifier::default());
    let store = Arc::new(MemoryRegistry::with_notifier(notifier.clone()));
    let manager = VariableManager::new(store);

    manager.create("A", "1", Scope::User).unwrap();
    let mut var = Variable::from_store("A", "1", Scope::User);
    var.set_value("2");
    manager.update(&var).unwrap();
    manager.delete(&var).unwrap();

    assert_eq!(notifier.count(), 3);
}

#[test]
fn search_spans_both_scopes() {
    let (_store, manager) = engine();
    manager.create("APP_HOME", r"C:\App", Scope::Machine).unwrap();
    manager.create("APP_CACHE", r"C:\Cache", Scope::User).unwrap();
    manager.create("UNRELATED", "x", Scope::User).unwrap();

    let hits = manager.search("app", true, false, false).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().any(|v| v.scope() == Scope::Machine));
    assert!(hits.iter().any(|v| v.scope() == Scope::User));
}

#[test]
fn identity_collision_across_case() {
    let (_store, manager) = engine();
    manager.create("Editor", "vim", Scope::User).unwrap();

    let err = manager.create("EDITOR", "nano", Scope::User).unwrap_err();
    assert!(matches!(err, EnvError::Manager(_)));

    // Same name in the other scope is a different identity.
    manager.create("EDITOR", "nano", Scope::Machine).unwrap();
}
