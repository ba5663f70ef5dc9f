//! Composition of registered filters into one record predicate.
//!
//! A [`CompositePredicate`] is the logical AND of every filter registered at the moment it was built.
//! The [`CompositePredicateBuilder`] keeps one current: it listens to a [`FilterRegistry`] and rebuilds
//! from scratch on every notification, installing each result wholesale into its [`PredicateSink`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use strainer_signals::{Broadcast, IntoBroadcastListener, ListenerGuard, ReadValueCell, Subscribe, SubscriptionGuard, ValueCell};
use tracing::debug;

use crate::error::FilterError;
use crate::filter::FilterSnapshot;
use crate::record::Filterable;
use crate::registry::{FilterRegistry, RegistryChange, WeakFilterRegistry};
use crate::scope::Scope;

/// Receives every predicate the builder produces. Implemented by record sources.
///
/// `install` runs on the thread that edited the registry, while it holds the registry lock. Editing the
/// same registry from inside `install` rebuilds again before `install` returns.
pub trait PredicateSink: Send + Sync {
    fn install(&self, predicate: CompositePredicate);
}

/// An immutable conjunction of filter snapshots. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CompositePredicate(Arc<[FilterSnapshot]>);

impl Default for CompositePredicate {
    fn default() -> Self { Self::accept_all() }
}

impl CompositePredicate {
    /// The identity predicate: accepts every record
    pub fn accept_all() -> Self { Self(Arc::from(Vec::new())) }

    pub fn from_snapshots(snapshots: Vec<FilterSnapshot>) -> Self { Self(snapshots.into()) }

    pub fn is_identity(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn filters(&self) -> &[FilterSnapshot] { &self.0 }

    /// Whether `record` passes every filter. Filters run in registration order and evaluation stops at
    /// the first one that rejects the record or fails.
    pub fn test(&self, record: &dyn Filterable) -> Result<bool, FilterError> {
        for snapshot in self.0.iter() {
            if !snapshot.test_entity(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluate this predicate over `items`, yielding one [`FilterResult`] per item
    pub fn filter<I>(&self, items: I) -> FilterIterator<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Filterable,
    {
        FilterIterator::new(items.into_iter(), self.clone())
    }
}

#[derive(Debug)]
pub enum FilterResult<R> {
    Pass(R),
    Skip(R),
    Error(R, FilterError),
}

impl<R> FilterResult<R> {
    pub fn is_pass(&self) -> bool { matches!(self, FilterResult::Pass(_)) }

    pub fn into_item(self) -> R {
        match self {
            FilterResult::Pass(item) | FilterResult::Skip(item) | FilterResult::Error(item, _) => item,
        }
    }
}

pub struct FilterIterator<I> {
    iter: I,
    predicate: CompositePredicate,
}

impl<I, R> FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable,
{
    pub fn new(iter: I, predicate: CompositePredicate) -> Self { Self { iter, predicate } }
}

impl<I, R> Iterator for FilterIterator<I>
where
    I: Iterator<Item = R>,
    R: Filterable,
{
    type Item = FilterResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|item| match self.predicate.test(&item) {
            Ok(true) => FilterResult::Pass(item),
            Ok(false) => FilterResult::Skip(item),
            Err(e) => FilterResult::Error(item, e),
        })
    }
}

/// Keeps a composite predicate in step with a registry.
///
/// The builder observes the registry weakly: it does not keep the registry alive, and the registry does
/// not keep the builder alive. Dropping the builder stops the rebuilds.
///
/// Rebuilds run under the registry lock, inside the edit that caused them, so rebuild order is edit
/// order and [`current_predicate`](Self::current_predicate) never lags behind the filters.
pub struct CompositePredicateBuilder {
    inner: Arc<BuilderInner>,
    _registry_guard: ListenerGuard<RegistryChange>,
}

struct BuilderInner {
    registry: WeakFilterRegistry,
    scope: Scope,
    current: ValueCell<CompositePredicate>,
    sink: Option<Arc<dyn PredicateSink>>,
    installed: Broadcast<CompositePredicate>,
    rebuilds: AtomicUsize,
}

impl CompositePredicateBuilder {
    pub fn new(registry: &FilterRegistry) -> Self { Self::build(registry, None) }

    /// A builder that installs every predicate it produces into `sink`, starting with the initial one
    pub fn with_sink(registry: &FilterRegistry, sink: Arc<dyn PredicateSink>) -> Self { Self::build(registry, Some(sink)) }

    fn build(registry: &FilterRegistry, sink: Option<Arc<dyn PredicateSink>>) -> Self {
        let inner = Arc::new(BuilderInner {
            registry: registry.downgrade(),
            scope: registry.scope().clone(),
            current: ValueCell::new(CompositePredicate::accept_all()),
            sink,
            installed: Broadcast::new(),
            rebuilds: AtomicUsize::new(0),
        });

        // subscribe before the initial build so no change can fall between the two
        let weak: Weak<BuilderInner> = Arc::downgrade(&inner);
        let guard = registry.on_change(move |change: RegistryChange| {
            if let Some(inner) = weak.upgrade() {
                debug!("CompositePredicateBuilder: rebuilding after {:?}", change);
                inner.rebuilds.fetch_add(1, Ordering::SeqCst);
                inner.refresh();
            }
        });
        inner.refresh();

        Self { inner, _registry_guard: guard }
    }

    /// AND-fold the registry's filters, as they are right now, into a predicate
    pub fn rebuild(registry: &FilterRegistry) -> CompositePredicate { CompositePredicate::from_snapshots(registry.snapshots()) }

    /// The latest predicate. Waits for an edit in progress to finish rebuilding.
    pub fn current_predicate(&self) -> CompositePredicate {
        let _held = self.inner.scope.lock();
        self.inner.current.value()
    }

    /// Read-only view of the current predicate. Reads through it do not wait for the registry lock.
    pub fn reader(&self) -> ReadValueCell<CompositePredicate> { self.inner.current.readvalue() }

    /// Number of rebuilds triggered by registry notifications. The initial build is not counted.
    pub fn rebuild_count(&self) -> usize { self.inner.rebuilds.load(Ordering::SeqCst) }
}

impl BuilderInner {
    fn refresh(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let _held = self.scope.lock();
        let predicate = CompositePredicateBuilder::rebuild(&registry);
        self.current.set(predicate.clone());
        if let Some(sink) = &self.sink {
            sink.install(predicate.clone());
        }
        debug!("CompositePredicateBuilder: installed predicate over {} filters", predicate.len());
        self.installed.send(predicate);
    }
}

impl Subscribe<CompositePredicate> for CompositePredicateBuilder {
    /// Receive every predicate produced after subscribing
    fn subscribe<L>(&self, listener: L) -> SubscriptionGuard
    where L: IntoBroadcastListener<CompositePredicate> {
        self.inner.installed.reference().listen(listener).into()
    }
}

impl std::fmt::Debug for CompositePredicateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositePredicateBuilder")
            .field("current", &self.inner.current)
            .field("rebuilds", &self.rebuild_count())
            .field("has_sink", &self.inner.sink.is_some())
            .finish()
    }
}
