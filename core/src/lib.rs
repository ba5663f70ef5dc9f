pub mod composite;
pub mod error;
pub mod filter;
pub mod path;
pub mod record;
pub mod registry;
mod scope;
pub mod source;
pub mod value;

pub use composite::{CompositePredicate, CompositePredicateBuilder, FilterIterator, FilterResult, PredicateSink};
pub use error::{AccessorError, DataSourceError, FilterError, RegistryError, ResolveError};
pub use filter::{Comparator, FieldFilter, FilterChange, FilterChangeKind, FilterMode, FilterSnapshot};
pub use path::FieldPath;
pub use record::{Accessors, Field, FieldType, Filterable, Property, Record, RecordSchema};
pub use registry::{FilterRegistry, RegistryChange, WeakFilterRegistry};
pub use scope::ScopeGuard;
pub use source::{DataChange, FilteredDataSource, ListDataSource, Repository};
pub use value::{CastError, Value, ValueType};

pub use strainer_signals as signals;
