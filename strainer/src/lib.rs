//! # Strainer
//!
//! Strainer filters in-memory records through a set of independent, observable field filters.
//! Callers register filters by dotted property path; a builder folds whatever is registered into a
//! single predicate and keeps it current as filters are added, removed or edited.
//!
//! ## Core Concepts
//!
//! - **Record**: a struct with an accessor table, usually generated by `#[derive(Record)]`
//! - **FieldFilter**: one constraint on one property (mode, reference value, case sensitivity)
//! - **FilterRegistry**: named filters in registration order; announces every change
//! - **CompositePredicate**: the AND of every registered filter, frozen when it was built
//! - **ListDataSource**: materialized records that fetch through the installed predicate
//!
//! ## Example
//!
//! ```rust
//! use strainer::{FieldFilter, FilterMode, FilteredDataSource, ListDataSource, Record};
//!
//! #[derive(Record, Debug, Clone, PartialEq)]
//! pub struct Country {
//!     code: String,
//! }
//!
//! #[derive(Record, Debug, Clone, PartialEq)]
//! pub struct Artist {
//!     name: String,
//!     country: Option<Country>,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let artists = FilteredDataSource::new(ListDataSource::new(vec![
//!     Artist { name: "Muse".into(), country: Some(Country { code: "GB".into() }) },
//!     Artist { name: "Metric".into(), country: Some(Country { code: "CA".into() }) },
//! ]));
//!
//! let country = FieldFilter::string("country.code").with_value("gb")?;
//! artists.add_property_filter(country.clone());
//! assert_eq!(artists.fetch()?.len(), 1);
//!
//! // Editing a registered filter is enough; the predicate is rebuilt automatically
//! country.set_mode(FilterMode::NotEquals);
//! assert_eq!(artists.fetch()?[0].name, "Metric");
//! # Ok(())
//! # }
//! ```

pub use strainer_core as core;
#[cfg(feature = "derive")]
pub use strainer_derive as derive;
pub use strainer_signals as signals;

// Re-export commonly used types
pub use strainer_core::{
    CastError, Comparator, FilterIterator, FilterResult, WeakFilterRegistry,
    composite, error, filter, path, record, registry, source, value, Accessors, AccessorError, CompositePredicate, CompositePredicateBuilder,
    DataChange, DataSourceError, Field, FieldFilter, FieldPath, FieldType, FilterChange, FilterChangeKind, FilterError, FilterMode,
    FilterRegistry, FilterSnapshot, FilteredDataSource, Filterable, ListDataSource, PredicateSink, Property, Record, RecordSchema,
    RegistryChange, RegistryError, Repository, ResolveError, ScopeGuard, Value, ValueType,
};
pub use strainer_signals::{ListenerGuard, Subscribe, SubscriptionGuard};

// Re-export the derive macro
#[cfg(feature = "derive")]
pub use strainer_derive::*;
