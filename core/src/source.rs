//! Record sources: a materialized list of records that serves filtered fetches.
//!
//! [`ListDataSource`] is the sink a [`CompositePredicateBuilder`] installs predicates into. It can be
//! seeded with a fixed list or backed by a [`Repository`]; [`FilteredDataSource`] wires a source to its
//! own registry and builder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use strainer_signals::{Broadcast, IntoBroadcastListener, ListenerGuard, Subscribe, SubscriptionGuard};
use tracing::{debug, info};

use crate::composite::{CompositePredicate, CompositePredicateBuilder, PredicateSink};
use crate::error::{DataSourceError, RegistryError};
use crate::filter::FieldFilter;
use crate::record::Record;
use crate::registry::FilterRegistry;

/// Persistent storage behind a record source
pub trait Repository<R>: Send + Sync {
    fn find_all(&self) -> anyhow::Result<Vec<R>>;
    fn save(&self, item: &R) -> anyhow::Result<()>;
    fn delete(&self, item: &R) -> anyhow::Result<()>;
}

/// Notifications emitted by a record source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChange {
    /// The visible record set may have changed: new predicate, reload, insert or removal
    Refresh,
    /// The record at `index` was refreshed in place
    Item { index: usize },
}

/// An in-memory record source.
///
/// Unless lazy, every fetch reloads the records from the repository first; a lazy source only reloads
/// on [`ListDataSource::refresh_all`]. Sources without a repository keep whatever they were given.
pub struct ListDataSource<R>(Arc<SourceInner<R>>);

struct SourceInner<R> {
    items: RwLock<Vec<R>>,
    predicate: RwLock<CompositePredicate>,
    repository: Option<Arc<dyn Repository<R>>>,
    lazy: AtomicBool,
    changes: Broadcast<DataChange>,
}

impl<R> Clone for ListDataSource<R> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<R> ListDataSource<R>
where R: Record + Clone + PartialEq
{
    pub fn new(items: Vec<R>) -> Self { Self::build(items, None) }

    /// A source backed by `repository`, loaded eagerly
    pub fn from_repository(repository: Arc<dyn Repository<R>>) -> Result<Self, DataSourceError> {
        let items = repository.find_all().map_err(DataSourceError::backend("find_all"))?;
        info!("ListDataSource: loaded {} records", items.len());
        Ok(Self::build(items, Some(repository)))
    }

    fn build(items: Vec<R>, repository: Option<Arc<dyn Repository<R>>>) -> Self {
        Self(Arc::new(SourceInner {
            items: RwLock::new(items),
            predicate: RwLock::new(CompositePredicate::accept_all()),
            repository,
            lazy: AtomicBool::new(false),
            changes: Broadcast::new(),
        }))
    }

    pub fn set_lazy(&self, lazy: bool) { self.0.lazy.store(lazy, Ordering::SeqCst); }
    pub fn is_lazy(&self) -> bool { self.0.lazy.load(Ordering::SeqCst) }

    /// Every materialized record, ignoring the predicate
    pub fn items(&self) -> Vec<R> { self.0.items.read().unwrap().clone() }
    pub fn len(&self) -> usize { self.0.items.read().unwrap().len() }
    pub fn is_empty(&self) -> bool { self.0.items.read().unwrap().is_empty() }

    pub fn predicate(&self) -> CompositePredicate { self.0.predicate.read().unwrap().clone() }

    /// The records passing the installed predicate, in source order
    pub fn fetch(&self) -> Result<Vec<R>, DataSourceError> {
        if !self.is_lazy() {
            self.reload()?;
        }
        let predicate = self.predicate();
        let items = self.0.items.read().unwrap();
        let mut passing = Vec::new();
        for item in items.iter() {
            if predicate.test(item)? {
                passing.push(item.clone());
            }
        }
        debug!("ListDataSource: {} of {} records pass {} filters", passing.len(), items.len(), predicate.len());
        Ok(passing)
    }

    /// Number of records passing the installed predicate
    pub fn count(&self) -> Result<usize, DataSourceError> { Ok(self.fetch()?.len()) }

    /// Persist and append `item`. The duplicate check, save and append happen under one write lock.
    pub fn add_item(&self, item: R) -> Result<(), DataSourceError> {
        {
            let mut items = self.0.items.write().unwrap();
            if items.contains(&item) {
                return Err(DataSourceError::Duplicate);
            }
            if let Some(repository) = &self.0.repository {
                repository.save(&item).map_err(DataSourceError::backend("save"))?;
            }
            items.push(item);
        }
        self.0.changes.send(DataChange::Refresh);
        Ok(())
    }

    /// Delete `item` from the repository and the materialized list. Returns whether it was present.
    pub fn delete_item(&self, item: &R) -> Result<bool, DataSourceError> {
        if let Some(repository) = &self.0.repository {
            repository.delete(item).map_err(DataSourceError::backend("delete"))?;
        }
        let removed = {
            let mut items = self.0.items.write().unwrap();
            let index = items.iter().position(|existing| existing == item);
            if let Some(index) = index {
                items.remove(index);
            }
            index.is_some()
        };
        if removed {
            self.0.changes.send(DataChange::Refresh);
        }
        Ok(removed)
    }

    /// Persist the current state of `item`, which must be materialized in this source
    pub fn refresh_item(&self, item: &R) -> Result<(), DataSourceError> {
        let index = self.0.items.read().unwrap().iter().position(|existing| existing == item).ok_or(DataSourceError::Missing)?;
        if let Some(repository) = &self.0.repository {
            repository.save(item).map_err(DataSourceError::backend("save"))?;
        }
        self.0.changes.send(DataChange::Item { index });
        Ok(())
    }

    /// Reload everything from the repository and announce a refresh
    pub fn refresh_all(&self) -> Result<(), DataSourceError> {
        self.reload()?;
        self.0.changes.send(DataChange::Refresh);
        Ok(())
    }

    fn reload(&self) -> Result<(), DataSourceError> {
        let Some(repository) = &self.0.repository else {
            return Ok(());
        };
        let items = repository.find_all().map_err(DataSourceError::backend("find_all"))?;
        *self.0.items.write().unwrap() = items;
        Ok(())
    }

    pub fn on_change<L>(&self, listener: L) -> ListenerGuard<DataChange>
    where L: IntoBroadcastListener<DataChange> {
        self.0.changes.reference().listen(listener)
    }
}

impl<R> PredicateSink for ListDataSource<R>
where R: Record + Clone + PartialEq
{
    fn install(&self, predicate: CompositePredicate) {
        *self.0.predicate.write().unwrap() = predicate;
        self.0.changes.send(DataChange::Refresh);
    }
}

impl<R> Subscribe<DataChange> for ListDataSource<R>
where R: Record + Clone + PartialEq
{
    fn subscribe<L>(&self, listener: L) -> SubscriptionGuard
    where L: IntoBroadcastListener<DataChange> {
        self.on_change(listener).into()
    }
}

impl<R> std::fmt::Debug for ListDataSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListDataSource")
            .field("items", &self.0.items.read().unwrap().len())
            .field("filters", &self.0.predicate.read().unwrap().len())
            .field("lazy", &self.0.lazy.load(Ordering::SeqCst))
            .field("repository", &self.0.repository.is_some())
            .finish()
    }
}

/// A record source with its own filter registry. Filters added here are applied to every fetch.
pub struct FilteredDataSource<R>
where R: Record + Clone + PartialEq
{
    source: ListDataSource<R>,
    registry: FilterRegistry,
    builder: CompositePredicateBuilder,
}

impl<R> FilteredDataSource<R>
where R: Record + Clone + PartialEq
{
    pub fn new(source: ListDataSource<R>) -> Self {
        let registry = FilterRegistry::new();
        let builder = CompositePredicateBuilder::with_sink(&registry, Arc::new(source.clone()));
        Self { source, registry, builder }
    }

    /// Register `filter` under its property name. An existing filter on that property is kept.
    pub fn add_property_filter(&self, filter: FieldFilter) -> bool { self.registry.add(filter) }

    pub fn property_filter(&self, name: &str) -> Result<FieldFilter, RegistryError> { self.registry.get(name) }

    pub fn remove_property_filter(&self, name: &str) -> Option<FieldFilter> { self.registry.remove(name) }

    pub fn clear_filters(&self) { self.registry.clear() }

    pub fn fetch(&self) -> Result<Vec<R>, DataSourceError> { self.source.fetch() }
    pub fn count(&self) -> Result<usize, DataSourceError> { self.source.count() }

    pub fn source(&self) -> &ListDataSource<R> { &self.source }
    pub fn registry(&self) -> &FilterRegistry { &self.registry }
    pub fn builder(&self) -> &CompositePredicateBuilder { &self.builder }
}
