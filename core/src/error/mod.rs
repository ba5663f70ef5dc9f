//! Public error types for strainer.
//!
//! Structural errors (bad paths, failing accessors, missing comparators, unknown registry names)
//! propagate to the caller. Data-shape mismatches never surface here: a record whose value cannot be
//! coerced to a filter's declared type simply fails that filter.

use thiserror::Error;

use crate::filter::FilterMode;
use crate::value::{CastError, ValueType};

/// Error raised by an accessor while producing a field.
///
/// Derived accessors never fail; hand-registered (computed) accessors use this to report a cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AccessorError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl AccessorError {
    pub fn new(message: impl Into<String>) -> Self { Self { message: message.into(), source: None } }

    pub fn with_source(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self { message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn message(&self) -> &str { &self.message }
}

/// Error type for dotted-path resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No accessor named `segment` exists on `type_name`
    #[error("field not found: no accessor for `{segment}` on {type_name} (path `{path}`)")]
    FieldNotFound { type_name: String, segment: String, path: String },

    /// The accessor exists but failed when invoked
    #[error("accessor `{segment}` on {type_name} failed (path `{path}`)")]
    AccessorInvocation {
        type_name: String,
        segment: String,
        path: String,
        #[source]
        source: AccessorError,
    },

    /// The path ends on a nested record rather than a comparable value
    #[error("path `{path}` resolves to a record of type {type_name}, not a value")]
    NotAValue { type_name: String, path: String },
}

impl ResolveError {
    /// The segment that could not be resolved, if the error is tied to one
    pub fn segment(&self) -> Option<&str> {
        match self {
            ResolveError::FieldNotFound { segment, .. } | ResolveError::AccessorInvocation { segment, .. } => Some(segment),
            ResolveError::NotAValue { .. } => None,
        }
    }
}

/// Error type for filter evaluation and configuration.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An ordering mode was evaluated on a filter constructed without a comparator
    #[error("filter on `{property}` has no comparator for mode {mode}")]
    MissingComparator { property: String, mode: FilterMode },

    /// A reference value was given that cannot be coerced to the filter's declared type
    #[error("filter on `{property}` expects {expected} values: {source}")]
    ValueType {
        property: String,
        expected: ValueType,
        #[source]
        source: CastError,
    },
}

/// Error type for registry lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no filter registered under `{0}`")]
    NotFound(String),
}

/// Error type for record source operations.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The backing repository failed
    #[error("repository {operation} failed")]
    Backend {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The item is already present in the materialized record set
    #[error("item is already present in the data source")]
    Duplicate,

    /// The item is not materialized in the data source
    #[error("item is not present in the data source")]
    Missing,

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl DataSourceError {
    pub(crate) fn backend(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| DataSourceError::Backend { operation, source }
    }
}
