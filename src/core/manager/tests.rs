// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the variable manager.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::VariableManager;
use crate::core::pathlist::{FixedProbe, PathList};
use crate::core::registry::RegistryStore;
use crate::core::registry::memory::MemoryRegistry;
use crate::core::variable::{ChangeKind, OperationKind, Outcome, Scope, Variable};
use crate::error::{EnvError, EnvResult};

/// Store wrapper counting reads, to observe cache behavior.
struct CountingStore {
    inner: MemoryRegistry,
    lists: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryRegistry::new(),
            lists: AtomicUsize::new(0),
        }
    }

    fn list_count(&self) -> usize {
        self.lists.load(Ordering::Relaxed)
    }
}

impl RegistryStore for CountingStore {
    fn list(&self, scope: Scope) -> EnvResult<BTreeMap<String, String>> {
        self.lists.fetch_add(1, Ordering::Relaxed);
        self.inner.list(scope)
    }

    fn get(&self, name: &str, scope: Scope) -> EnvResult<Option<String>> {
        self.inner.get(name, scope)
    }

    fn set(&self, name: &str, value: &str, scope: Scope) -> EnvResult<()> {
        self.inner.set(name, value, scope)
    }

    fn delete(&self, name: &str, scope: Scope) -> EnvResult<()> {
        self.inner.delete(name, scope)
    }

    fn import_scope(
        &self,
        scope: Scope,
        entries: &[(String, String)],
        replace: bool,
    ) -> EnvResult<()> {
        self.inner.import_scope(scope, entries, replace)
    }
}

fn manager() -> (Arc<MemoryRegistry>, VariableManager) {
    let store = Arc::new(MemoryRegistry::new());
    let manager = VariableManager::new(store.clone());
    (store, manager)
}

#[test]
fn test_create_persists_and_records() {
    let (store, manager) = manager();
    manager.create("EDITOR", "vim", Scope::User).unwrap();

    assert_eq!(
        store.get("EDITOR", Scope::User).unwrap().as_deref(),
        Some("vim")
    );

    let history = manager.get_history(None);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, OperationKind::Create);
    assert_eq!(history[0].outcome, Outcome::Success);
    assert_eq!(history[0].previous_value, None);
}

#[test]
fn test_create_trims_the_name() {
    let (store, manager) = manager();
    manager.create("  EDITOR  ", "vim", Scope::User).unwrap();
    assert!(store.exists("EDITOR", Scope::User).unwrap());
}

#[test]
fn test_create_existing_fails_and_leaves_entry() {
    let (store, manager) = manager();
    manager.create("EDITOR", "vim", Scope::User).unwrap();

    let err = manager.create("editor", "nano", Scope::User).unwrap_err();
    assert!(matches!(err, EnvError::Manager(_)));

    // The existing entry and the history are untouched.
    assert_eq!(
        store.get("EDITOR", Scope::User).unwrap().as_deref(),
        Some("vim")
    );
    assert_eq!(manager.get_history(None).len(), 1);
}

#[test]
fn test_validation_failure_stops_before_store() {
    let store = Arc::new(CountingStore::new());
    let manager = VariableManager::new(store.clone());

    let err = manager.create("BAD=NAME", "x", Scope::User).unwrap_err();
    assert!(matches!(err, EnvError::Validation(_)));
    assert!(store.inner.list(Scope::User).unwrap().is_empty());
    assert!(manager.get_history(None).is_empty());
}

#[test]
fn test_machine_create_without_elevation() {
    let (store, manager) = manager();
    store.set_elevated(false);

    let err = manager.create("EDITOR", "vim", Scope::Machine).unwrap_err();
    assert!(matches!(err, EnvError::Registry(_)));

    store.set_elevated(true);
    assert!(store.list(Scope::Machine).unwrap().is_empty());
    assert!(manager.get_history(None).is_empty());
}

#[test]
fn test_update_missing_is_not_found() {
    let (_store, manager) = manager();
    let ghost = Variable::from_store("GHOST", "x", Scope::User);
    let err = manager.update(&ghost).unwrap_err();
    assert!(matches!(err, EnvError::Manager(_)));
}

#[test]
fn test_update_records_previous_value() {
    let (store, manager) = manager();
    manager.create("EDITOR", "vim", Scope::User).unwrap();

    let mut var = Variable::from_store("EDITOR", "vim", Scope::User);
    var.set_value("nano");
    manager.update(&var).unwrap();

    assert_eq!(
        store.get("EDITOR", Scope::User).unwrap().as_deref(),
        Some("nano")
    );
    let history = manager.get_history(None);
    assert_eq!(history[1].kind, OperationKind::Update);
    assert_eq!(history[1].previous_value.as_deref(), Some("vim"));
}

#[test]
fn test_reserved_update_fails_before_store_access() {
    let store = Arc::new(CountingStore::new());
    let manager = VariableManager::new(store.clone());

    let windir = Variable::from_store("WINDIR", r"D:\Windows", Scope::Machine);
    let err = manager.update(&windir).unwrap_err();
    assert!(matches!(err, EnvError::Validation(_)));
    assert_eq!(store.list_count(), 0);
}

#[test]
fn test_reserved_delete_refused() {
    let (_store, manager) = manager();
    let windir = Variable::from_store("windir", r"C:\Windows", Scope::Machine);
    let err = manager.delete(&windir).unwrap_err();
    assert!(matches!(err, EnvError::Validation(_)));
}

#[test]
fn test_delete_missing_is_success() {
    let (_store, manager) = manager();
    let ghost = Variable::from_store("GHOST", "", Scope::User);
    manager.delete(&ghost).unwrap();

    let history = manager.get_history(None);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, OperationKind::Delete);
    assert_eq!(history[0].previous_value, None);
}

#[test]
fn test_cache_serves_repeat_reads() {
    let store = Arc::new(CountingStore::new());
    store.inner.set("A", "1", Scope::User).unwrap();
    let manager = VariableManager::new(store.clone()).with_ttl(Duration::from_secs(600));

    let first = manager.get_all().unwrap();
    assert_eq!(store.list_count(), 2); // machine + user

    let second = manager.get_all().unwrap();
    assert_eq!(store.list_count(), 2, "second read must hit the cache");
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!((a.name(), a.value()), (b.name(), b.value()));
    }
}

#[test]
fn test_mutation_invalidates_cache() {
    let store = Arc::new(CountingStore::new());
    let manager = VariableManager::new(store.clone()).with_ttl(Duration::from_secs(600));

    let _ = manager.get_all().unwrap();
    assert_eq!(store.list_count(), 2);

    // A user-scope mutation invalidates both scopes.
    manager.create("A", "1", Scope::User).unwrap();
    let all = manager.get_all().unwrap();
    assert_eq!(store.list_count(), 4);
    assert_eq!(all.len(), 1);
}

#[test]
fn test_cache_expires_after_ttl() {
    let store = Arc::new(CountingStore::new());
    let manager = VariableManager::new(store.clone()).with_ttl(Duration::from_millis(1));

    let _ = manager.get_all().unwrap();
    std::thread::sleep(Duration::from_millis(10));
    let _ = manager.get_all().unwrap();
    assert_eq!(store.list_count(), 4);
}

#[test]
fn test_refresh_clears_the_cache() {
    let store = Arc::new(CountingStore::new());
    let manager = VariableManager::new(store.clone()).with_ttl(Duration::from_secs(600));

    let _ = manager.get_by_scope(Scope::User).unwrap();
    manager.refresh();
    let _ = manager.get_by_scope(Scope::User).unwrap();
    assert_eq!(store.list_count(), 2);
}

#[test]
fn test_subscribers_see_events_in_order() {
    let (_store, manager) = manager();
    let seen: Arc<std::sync::Mutex<Vec<(ChangeKind, String, Option<String>)>>> =
        Arc::new(std::sync::Mutex::new(Vec::new()));

    let sink = seen.clone();
    manager.subscribe(move |event| {
        sink.lock().unwrap().push((
            event.kind,
            event.variable.name().to_string(),
            event.old_value.clone(),
        ));
    });

    manager.create("EDITOR", "vim", Scope::User).unwrap();
    let mut var = Variable::from_store("EDITOR", "vim", Scope::User);
    var.set_value("nano");
    manager.update(&var).unwrap();
    manager.delete(&var).unwrap();

    let events = seen.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (ChangeKind::Created, "EDITOR".to_string(), None),
            (ChangeKind::Updated, "EDITOR".to_string(), Some("vim".to_string())),
            (ChangeKind::Deleted, "EDITOR".to_string(), Some("nano".to_string())),
        ]
    );
}

#[test]
fn test_panicking_subscriber_does_not_stop_fanout() {
    let (_store, manager) = manager();
    manager.subscribe(|_| panic!("listener bug"));

    let seen = Arc::new(AtomicUsize::new(0));
    let sink = seen.clone();
    manager.subscribe(move |_| {
        sink.fetch_add(1, Ordering::Relaxed);
    });

    manager.create("EDITOR", "vim", Scope::User).unwrap();
    assert_eq!(seen.load(Ordering::Relaxed), 1);
}

#[test]
fn test_unsubscribe() {
    let (_store, manager) = manager();
    let seen = Arc::new(AtomicUsize::new(0));
    let sink = seen.clone();
    let id = manager.subscribe(move |_| {
        sink.fetch_add(1, Ordering::Relaxed);
    });

    assert!(manager.unsubscribe(id));
    assert!(!manager.unsubscribe(id));

    manager.create("EDITOR", "vim", Scope::User).unwrap();
    assert_eq!(seen.load(Ordering::Relaxed), 0);
}

#[test]
fn test_history_is_bounded_fifo() {
    let store = Arc::new(MemoryRegistry::new());
    let manager = VariableManager::new(store).with_history_capacity(2);

    manager.create("A", "1", Scope::User).unwrap();
    manager.create("B", "2", Scope::User).unwrap();
    manager.create("C", "3", Scope::User).unwrap();

    let history = manager.get_history(None);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].variable.name(), "B");
    assert_eq!(history[1].variable.name(), "C");

    let limited = manager.get_history(Some(1));
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].variable.name(), "C");

    manager.clear_history();
    assert!(manager.get_history(None).is_empty());
}

#[test]
fn test_search_matches_names_and_values() {
    let (_store, manager) = manager();
    manager.create("EDITOR", "vim", Scope::User).unwrap();
    manager.create("VISUAL", "emacs", Scope::User).unwrap();
    manager.create("PAGER", "less", Scope::Machine).unwrap();

    // Empty query returns everything.
    assert_eq!(manager.search("", true, true, false).unwrap().len(), 3);

    let by_name = manager.search("edit", true, false, false).unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name(), "EDITOR");

    let by_value = manager.search("vim", false, true, false).unwrap();
    assert_eq!(by_value.len(), 1);

    // Case-sensitive search misses a differently-cased needle.
    assert!(manager.search("EDIT", true, false, true).unwrap().is_empty());
    assert_eq!(manager.search("EDIT", true, false, false).unwrap().len(), 1);
}

#[test]
fn test_list_values_are_normalized_before_persisting() {
    let store = Arc::new(MemoryRegistry::new());
    let probe = FixedProbe::with_dirs([r"C:\A", r"C:\B"]);
    let manager = VariableManager::new(store.clone())
        .with_path_engine(PathList::with_probe(Box::new(probe)));

    manager
        .create("PATH", "C:/A;;\"C:\\B\\\"", Scope::User)
        .unwrap();
    assert_eq!(
        store.get("PATH", Scope::User).unwrap().as_deref(),
        Some(r"C:\A;C:\B")
    );

    // Non-list values pass through untouched.
    manager.create("EDITOR", " vim // ", Scope::User).unwrap();
    assert_eq!(
        store.get("EDITOR", Scope::User).unwrap().as_deref(),
        Some(" vim // ")
    );
}
