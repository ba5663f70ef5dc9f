//! The coarse lock that makes a registry mutation and its rebuild one step.
//!
//! A [`FilterRegistry`](crate::FilterRegistry) owns one scope and lends it to every filter it
//! registers and to every builder observing it. Filter setters, registry edits and predicate
//! rebuilds all run while holding it, and so do the readers of filter state and of the current
//! predicate. The lock is reentrant: listeners notified while it is held may read or edit the
//! registry again on the same thread.

use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

#[derive(Clone)]
pub(crate) struct Scope(Arc<ReentrantMutex<()>>);

/// Holding this guard keeps every filter of a registry, and every predicate built from it, from
/// changing. Obtained from [`FilterRegistry::lock`](crate::FilterRegistry::lock).
#[must_use = "the registry is unlocked as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    _held: ReentrantMutexGuard<'a, ()>,
}

impl Scope {
    pub fn new() -> Self { Self(Arc::new(ReentrantMutex::new(()))) }

    pub fn lock(&self) -> ScopeGuard<'_> { ScopeGuard { _held: self.0.lock() } }

    pub fn ptr_eq(&self, other: &Scope) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl std::fmt::Debug for ScopeGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("ScopeGuard") }
}
