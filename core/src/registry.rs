use std::sync::{Arc, Mutex, Weak};

use indexmap::IndexMap;
use strainer_signals::{Broadcast, IntoBroadcastListener, ListenerGuard, Subscribe, SubscriptionGuard};
use tracing::debug;

use crate::error::RegistryError;
use crate::filter::{FieldFilter, FilterChange, FilterSnapshot};
use crate::scope::{Scope, ScopeGuard};

/// A change to a registry: its membership, or one of its filters.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryChange {
    Inserted { name: String },
    Removed { name: String },
    /// One notification for the whole clear, listing every removed name in registration order
    Cleared { names: Vec<String> },
    /// A registered filter changed its value, mode or case sensitivity
    Filter { name: String, change: FilterChange },
}

impl RegistryChange {
    /// The entry name(s) this change concerns
    pub fn names(&self) -> Vec<&str> {
        match self {
            RegistryChange::Inserted { name } | RegistryChange::Removed { name } | RegistryChange::Filter { name, .. } => vec![name.as_str()],
            RegistryChange::Cleared { names } => names.iter().map(String::as_str).collect(),
        }
    }
}

struct Entry {
    filter: FieldFilter,
    // forwards the filter's changes into the registry broadcast while the entry lives
    _guard: ListenerGuard<FilterChange>,
}

/// An ordered, named collection of field filters that announces every change to itself and to its
/// filters.
///
/// Names are unique and the first registration under a name wins. Iteration follows registration
/// order. Clones share the same entries.
///
/// Every edit, to the registry or to one of its filters, runs under one registry-wide lock together
/// with the listeners it notifies, so observers rebuild before anyone else can read or edit.
#[derive(Clone)]
pub struct FilterRegistry(Arc<Inner>);

/// Weak reference to a registry, used by observers that must not keep it alive
#[derive(Clone)]
pub struct WeakFilterRegistry(Weak<Inner>);

struct Inner {
    scope: Scope,
    entries: Mutex<IndexMap<String, Entry>>,
    changes: Broadcast<RegistryChange>,
}

impl WeakFilterRegistry {
    pub fn upgrade(&self) -> Option<FilterRegistry> { self.0.upgrade().map(FilterRegistry) }
}

impl Default for FilterRegistry {
    fn default() -> Self { Self::new() }
}

impl FilterRegistry {
    pub fn new() -> Self { Self(Arc::new(Inner { scope: Scope::new(), entries: Mutex::new(IndexMap::new()), changes: Broadcast::new() })) }

    pub fn downgrade(&self) -> WeakFilterRegistry { WeakFilterRegistry(Arc::downgrade(&self.0)) }

    /// Block every edit to this registry and its filters while the guard lives. Reads made by the
    /// holding thread see filters and built predicates that agree with each other.
    pub fn lock(&self) -> ScopeGuard<'_> { self.0.scope.lock() }

    pub(crate) fn scope(&self) -> &Scope { &self.0.scope }

    /// Register `filter` under `name` unless the name is taken. Returns whether it was inserted.
    pub fn put_if_absent(&self, name: impl Into<String>, filter: FieldFilter) -> bool {
        let name = name.into();
        let _held = self.0.scope.lock();
        {
            let mut entries = self.0.entries.lock().unwrap();
            if entries.contains_key(&name) {
                debug!("FilterRegistry: `{}` already registered, keeping the existing filter", name);
                return false;
            }
            filter.join_scope(&self.0.scope);
            let guard = self.forward(name.clone(), &filter);
            entries.insert(name.clone(), Entry { filter, _guard: guard });
        }
        debug!("FilterRegistry: inserted `{}`", name);
        self.0.changes.send(RegistryChange::Inserted { name });
        true
    }

    /// Register `filter` under its own property name
    pub fn add(&self, filter: FieldFilter) -> bool { self.put_if_absent(filter.property_name().to_string(), filter) }

    fn forward(&self, name: String, filter: &FieldFilter) -> ListenerGuard<FilterChange> {
        let changes = self.0.changes.clone();
        filter.listen(move |change: FilterChange| changes.send(RegistryChange::Filter { name: name.clone(), change }))
    }

    /// Remove the entry under `name`, returning its filter. The filter stops notifying this registry.
    pub fn remove(&self, name: &str) -> Option<FieldFilter> {
        let _held = self.0.scope.lock();
        let entry = self.0.entries.lock().unwrap().shift_remove(name)?;
        entry.filter.leave_scope(&self.0.scope);
        debug!("FilterRegistry: removed `{}`", name);
        self.0.changes.send(RegistryChange::Removed { name: name.to_string() });
        Some(entry.filter)
    }

    /// Remove every entry with a single notification
    pub fn clear(&self) {
        let _held = self.0.scope.lock();
        let drained = std::mem::take(&mut *self.0.entries.lock().unwrap());
        if drained.is_empty() {
            return;
        }
        let names: Vec<String> = drained
            .into_iter()
            .map(|(name, entry)| {
                entry.filter.leave_scope(&self.0.scope);
                name
            })
            .collect();
        debug!("FilterRegistry: cleared {} filters", names.len());
        self.0.changes.send(RegistryChange::Cleared { names });
    }

    pub fn get(&self, name: &str) -> Result<FieldFilter, RegistryError> {
        self.0.entries.lock().unwrap().get(name).map(|entry| entry.filter.clone()).ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool { self.0.entries.lock().unwrap().contains_key(name) }
    pub fn len(&self) -> usize { self.0.entries.lock().unwrap().len() }
    pub fn is_empty(&self) -> bool { self.0.entries.lock().unwrap().is_empty() }
    pub fn names(&self) -> Vec<String> { self.0.entries.lock().unwrap().keys().cloned().collect() }
    pub fn filters(&self) -> Vec<FieldFilter> { self.0.entries.lock().unwrap().values().map(|entry| entry.filter.clone()).collect() }

    pub fn entries(&self) -> Vec<(String, FieldFilter)> {
        self.0.entries.lock().unwrap().iter().map(|(name, entry)| (name.clone(), entry.filter.clone())).collect()
    }

    /// Snapshots of every filter, taken together under the registry lock, in registration order
    pub fn snapshots(&self) -> Vec<FilterSnapshot> {
        let _held = self.0.scope.lock();
        self.0.entries.lock().unwrap().values().map(|entry| entry.filter.snapshot_held()).collect()
    }

    /// Listen for registry changes. Dropping the guard unsubscribes.
    pub fn on_change<L>(&self, listener: L) -> ListenerGuard<RegistryChange>
    where L: IntoBroadcastListener<RegistryChange> {
        self.0.changes.reference().listen(listener)
    }
}

impl Subscribe<RegistryChange> for FilterRegistry {
    fn subscribe<L>(&self, listener: L) -> SubscriptionGuard
    where L: IntoBroadcastListener<RegistryChange> {
        self.on_change(listener).into()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.0.entries.lock().unwrap();
        f.debug_map().entries(entries.iter().map(|(name, entry)| (name, &entry.filter))).finish()
    }
}
