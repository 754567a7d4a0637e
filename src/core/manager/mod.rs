// envman-rs: Windows Environment Variable Manager - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Variable manager: orchestrates store, validator, and path engine.
//!
//! ```text
//! VariableManager::new(store)
//!   .with_ttl()  .with_history_capacity()
//!
//! get_all / get_by_scope     TTL cache, shared stamp
//! create / update / delete   validate -> persist -> then:
//!     invalidate cache + append history   (one mutex, atomic)
//!     fan out ChangeEvent to subscribers  (panic-isolated)
//! search / history / subscribe
//!
//! Failed validation or store call leaves cache, history, and
//! subscribers untouched; only broadcast failures are invisible here.
//! ```

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::core::pathlist::PathList;
use crate::core::registry::RegistryStore;
use crate::core::validator;
use crate::core::variable::{
    ChangeEvent, ChangeKind, OperationKind, OperationRecord, Scope, Variable,
};
use crate::error::{EnvResult, ManagerError, ValidationError};

/// Default maximum age of a cached snapshot.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Default bound of the operation history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Handle returned by [`VariableManager::subscribe`].
pub type SubscriberId = u64;

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Two scope snapshots sharing one timestamp.
#[derive(Default)]
struct Cache {
    machine: Option<Vec<Variable>>,
    user: Option<Vec<Variable>>,
    stamp: Option<Instant>,
}

impl Cache {
    fn snapshot(&self, scope: Scope) -> Option<&Vec<Variable>> {
        match scope {
            Scope::Machine => self.machine.as_ref(),
            Scope::User => self.user.as_ref(),
        }
    }

    fn set_snapshot(&mut self, scope: Scope, vars: Vec<Variable>) {
        match scope {
            Scope::Machine => self.machine = Some(vars),
            Scope::User => self.user = Some(vars),
        }
        if self.stamp.is_none() {
            self.stamp = Some(Instant::now());
        }
    }

    fn clear(&mut self) {
        self.machine = None;
        self.user = None;
        self.stamp = None;
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        self.stamp.is_none_or(|s| s.elapsed() > ttl)
    }
}

/// State guarded as one unit: cache invalidation and history append must
/// be observed atomically together by concurrent readers.
struct State {
    cache: Cache,
    history: VecDeque<OperationRecord>,
    subscribers: Vec<(SubscriberId, Callback)>,
    next_subscriber: SubscriberId,
}

/// Orchestrator owning cache, history, and subscriber list.
pub struct VariableManager {
    store: Arc<dyn RegistryStore>,
    paths: PathList,
    ttl: Duration,
    history_capacity: usize,
    state: Mutex<State>,
}

impl VariableManager {
    /// Creates a manager over the given store with default TTL and
    /// history capacity.
    #[must_use]
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self {
            store,
            paths: PathList::new(),
            ttl: DEFAULT_CACHE_TTL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            state: Mutex::new(State {
                cache: Cache::default(),
                history: VecDeque::new(),
                subscribers: Vec::new(),
                next_subscriber: 0,
            }),
        }
    }

    /// Sets the cache TTL.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the history capacity (oldest records evicted beyond it).
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Replaces the path engine used to normalize list values.
    #[must_use]
    pub fn with_path_engine(mut self, paths: PathList) -> Self {
        self.paths = paths;
        self
    }

    /// Round-trips a list value through the path engine so the persisted
    /// form is normalized; other values pass through unchanged.
    fn normalize_value(&self, name: &str, value: &str) -> String {
        if validator::is_list_valued(name) {
            PathList::build(&self.paths.parse(value))
        } else {
            value.to_string()
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("manager state poisoned")
    }

    /// Returns the cached snapshot for a scope, reading through the store
    /// when absent or stale. The shared stamp starts with the first
    /// population after an invalidation.
    fn snapshot(&self, scope: Scope) -> EnvResult<Vec<Variable>> {
        let mut state = self.lock();
        if state.cache.is_stale(self.ttl) {
            state.cache.clear();
        }
        if let Some(vars) = state.cache.snapshot(scope) {
            return Ok(vars.clone());
        }

        let table = self.store.list(scope)?;
        let vars: Vec<Variable> = table
            .into_iter()
            .map(|(name, value)| Variable::from_store(name, value, scope))
            .collect();
        state.cache.set_snapshot(scope, vars.clone());
        Ok(vars)
    }

    /// All variables of one scope.
    ///
    /// # Errors
    ///
    /// Propagates store access errors unchanged.
    pub fn get_by_scope(&self, scope: Scope) -> EnvResult<Vec<Variable>> {
        self.snapshot(scope)
    }

    /// All variables of both scopes, machine first.
    ///
    /// # Errors
    ///
    /// Propagates store access errors unchanged.
    pub fn get_all(&self) -> EnvResult<Vec<Variable>> {
        let mut vars = self.snapshot(Scope::Machine)?;
        vars.extend(self.snapshot(Scope::User)?);
        Ok(vars)
    }

    /// Drops both cached snapshots; the next read goes to the store.
    pub fn refresh(&self) {
        self.lock().cache.clear();
    }

    /// Creates a new variable.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for rule violations,
    /// [`ManagerError::AlreadyExists`] when the identity is taken, and
    /// store errors unchanged. On any failure, cache, history, and
    /// subscribers are untouched.
    pub fn create(&self, name: &str, value: &str, scope: Scope) -> EnvResult<()> {
        let name = name.trim();
        let value = self.normalize_value(name, value);
        let mut variable = Variable::new(name, value.clone(), scope);
        validator::validate_variable(&variable)?;

        if self.store.exists(name, scope)? {
            return Err(ManagerError::AlreadyExists {
                name: name.to_string(),
                scope,
            }
            .into());
        }

        self.store.set(name, &value, scope)?;
        variable.apply_changes();
        self.commit(OperationKind::Create, ChangeKind::Created, variable, None);
        Ok(())
    }

    /// Persists a changed variable.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for rule violations (checked before any store
    /// access), [`ManagerError::NotFound`] when the identity is absent,
    /// and store errors unchanged.
    pub fn update(&self, variable: &Variable) -> EnvResult<()> {
        let mut pending = variable.clone();
        pending.set_value(self.normalize_value(variable.name(), variable.value()));
        validator::validate_variable(&pending)?;

        let name = pending.name().to_string();
        let scope = pending.scope();
        let Some(old_value) = self.store.get(&name, scope)? else {
            return Err(ManagerError::NotFound { name, scope }.into());
        };

        self.store.set(&name, pending.value(), scope)?;
        let mut applied = pending;
        applied.apply_changes();
        self.commit(
            OperationKind::Update,
            ChangeKind::Updated,
            applied,
            Some(old_value),
        );
        Ok(())
    }

    /// Deletes a variable. Missing entries delete successfully.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ReservedName`] for reserved names (checked
    /// before any store access), and store errors unchanged.
    pub fn delete(&self, variable: &Variable) -> EnvResult<()> {
        let name = variable.name();
        if validator::is_reserved(name) {
            return Err(ValidationError::ReservedName {
                name: name.to_string(),
            }
            .into());
        }

        let scope = variable.scope();
        let old_value = self.store.get(name, scope)?;
        self.store.delete(name, scope)?;

        let mut deleted = variable.clone();
        deleted.mark_deleted();
        self.commit(OperationKind::Delete, ChangeKind::Deleted, deleted, old_value);
        Ok(())
    }

    /// Linear scan over both scopes. An empty query returns everything.
    ///
    /// # Errors
    ///
    /// Propagates store access errors unchanged.
    pub fn search(
        &self,
        query: &str,
        in_name: bool,
        in_value: bool,
        case_sensitive: bool,
    ) -> EnvResult<Vec<Variable>> {
        let all = self.get_all()?;
        if query.is_empty() {
            return Ok(all);
        }

        let needle = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        let matches = |hay: &str| {
            if case_sensitive {
                hay.contains(&needle)
            } else {
                hay.to_lowercase().contains(&needle)
            }
        };

        Ok(all
            .into_iter()
            .filter(|v| (in_name && matches(v.name())) || (in_value && matches(v.value())))
            .collect())
    }

    /// The most recent records, oldest first.
    #[must_use]
    pub fn get_history(&self, limit: Option<usize>) -> Vec<OperationRecord> {
        let state = self.lock();
        let len = state.history.len();
        let skip = limit.map_or(0, |l| len.saturating_sub(l));
        state.history.iter().skip(skip).cloned().collect()
    }

    pub fn clear_history(&self) {
        self.lock().history.clear();
    }

    /// Registers a change subscriber. Registration order is fan-out order.
    pub fn subscribe(
        &self,
        callback: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> SubscriberId {
        let mut state = self.lock();
        let id = state.next_subscriber;
        state.next_subscriber += 1;
        state.subscribers.push((id, Arc::new(callback)));
        id
    }

    /// Removes a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut state = self.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sid, _)| *sid != id);
        state.subscribers.len() != before
    }

    /// Post-persistence sequence: cache invalidation and history append
    /// under one lock, then panic-isolated subscriber fan-out.
    fn commit(
        &self,
        kind: OperationKind,
        change: ChangeKind,
        variable: Variable,
        old_value: Option<String>,
    ) {
        let callbacks: Vec<Callback> = {
            let mut state = self.lock();
            state.cache.clear();
            let record = OperationRecord::success(kind, variable.clone(), old_value.clone());
            self.append_history(&mut state, record);
            state.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };

        let event = ChangeEvent {
            kind: change,
            variable,
            old_value,
        };
        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                tracing::warn!(
                    "change subscriber panicked handling {} of '{}'",
                    kind,
                    event.variable.name()
                );
            }
        }
    }

    fn append_history(&self, state: &mut State, record: OperationRecord) {
        if self.history_capacity == 0 {
            return;
        }
        if state.history.len() == self.history_capacity {
            state.history.pop_front();
        }
        state.history.push_back(record);
    }
}

#[cfg(test)]
mod tests;
