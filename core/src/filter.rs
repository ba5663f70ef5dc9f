//! Single-field filters.
//!
//! A [`FieldFilter`] constrains one dotted property of a record: it holds a comparison mode, an
//! optional reference value, a case-sensitivity flag and (for ordering modes) a comparator. It is a
//! shared handle: clones observe and mutate the same filter, and every effective mutation is
//! announced on the filter's own change channel.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use strainer_signals::{Broadcast, IntoBroadcastListener, ListenerGuard, Ref, Subscribe, SubscriptionGuard};
use tracing::{debug, warn};

use crate::error::{FilterError, ResolveError};
use crate::path::FieldPath;
use crate::record::Filterable;
use crate::scope::Scope;
use crate::value::{Value, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMode {
    /// Substring match on string representations. Meant for strings; other types are compared as text
    Contains,
    #[default]
    Equals,
    Greater,
    Smaller,
    GreaterOrEqual,
    SmallerOrEqual,
    NotContains,
    NotEquals,
}

impl FilterMode {
    pub const ALL: [FilterMode; 8] = [
        FilterMode::Contains,
        FilterMode::Equals,
        FilterMode::Greater,
        FilterMode::Smaller,
        FilterMode::GreaterOrEqual,
        FilterMode::SmallerOrEqual,
        FilterMode::NotContains,
        FilterMode::NotEquals,
    ];

    /// Modes that need a comparator
    pub fn is_ordering(&self) -> bool {
        matches!(self, FilterMode::Greater | FilterMode::Smaller | FilterMode::GreaterOrEqual | FilterMode::SmallerOrEqual)
    }

    pub fn is_containment(&self) -> bool { matches!(self, FilterMode::Contains | FilterMode::NotContains) }
}

impl Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FilterMode::Contains => "CONTAINS",
            FilterMode::Equals => "EQUALS",
            FilterMode::Greater => "GREATER",
            FilterMode::Smaller => "SMALLER",
            FilterMode::GreaterOrEqual => "GREATER_OR_EQUAL",
            FilterMode::SmallerOrEqual => "SMALLER_OR_EQUAL",
            FilterMode::NotContains => "NOT_CONTAINS",
            FilterMode::NotEquals => "NOT_EQUALS",
        })
    }
}

/// Ordering used by the GREATER/SMALLER family of modes. Both operands are already coerced to the
/// filter's declared type when the comparator runs.
#[derive(Clone)]
pub struct Comparator(Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>);

impl Comparator {
    pub fn new(compare: impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static) -> Self { Self(Arc::new(compare)) }

    /// Lexicographic ordering of string representations
    pub fn lexicographic() -> Self {
        Self::new(|a, b| match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => a.cmp(b),
            _ => a.to_string().cmp(&b.to_string()),
        })
    }

    /// Numeric ordering after widening both sides to f64. Non-numbers sort after numbers.
    pub fn numeric() -> Self {
        Self::new(|a, b| match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    }

    /// Ordering of enum ordinals
    pub fn ordinal() -> Self { Self::new(|a, b| a.as_i64().cmp(&b.as_i64())) }

    /// `false` sorts before `true`
    pub fn boolean() -> Self { Self::new(|a, b| a.as_bool().cmp(&b.as_bool())) }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering { (self.0)(a, b) }
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("Comparator(..)") }
}

/// One effective change to a filter's state.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChange {
    /// The filter's property path
    pub property: String,
    pub kind: FilterChangeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterChangeKind {
    Value { old: Option<Value>, new: Option<Value> },
    Mode { old: FilterMode, new: FilterMode },
    IgnoreCase { old: bool, new: bool },
}

impl FilterChangeKind {
    /// The name of the setting that changed
    pub fn field_name(&self) -> &'static str {
        match self {
            FilterChangeKind::Value { .. } => "value",
            FilterChangeKind::Mode { .. } => "mode",
            FilterChangeKind::IgnoreCase { .. } => "ignore_case",
        }
    }
}

#[derive(Debug, Clone)]
struct FilterState {
    mode: FilterMode,
    value: Option<Value>,
    ignore_case: bool,
}

impl Default for FilterState {
    fn default() -> Self { Self { mode: FilterMode::Equals, value: None, ignore_case: true } }
}

/// Immutable copy of a filter's configuration at one point in time.
///
/// Composite predicates are made of snapshots, so a predicate never changes after it was built.
#[derive(Debug, Clone)]
pub struct FilterSnapshot {
    path: FieldPath,
    value_type: ValueType,
    comparator: Option<Comparator>,
    state: FilterState,
}

impl FilterSnapshot {
    pub fn property_name(&self) -> &str { self.path.as_str() }
    pub fn path(&self) -> &FieldPath { &self.path }
    pub fn value_type(&self) -> ValueType { self.value_type }
    pub fn mode(&self) -> FilterMode { self.state.mode }
    pub fn filter_value(&self) -> Option<&Value> { self.state.value.as_ref() }
    pub fn ignore_case(&self) -> bool { self.state.ignore_case }

    /// An inert filter has no reference value and accepts everything
    pub fn is_inert(&self) -> bool { self.state.value.is_none() }

    /// Test an already resolved property value. `None` is a null value.
    pub fn test_property(&self, value: Option<&Value>) -> Result<bool, FilterError> {
        let (Some(filter_value), Some(value)) = (self.state.value.as_ref(), value) else {
            return Ok(true);
        };

        let value = match self.coerce(value) {
            Ok(value) => value,
            Err(err) => {
                debug!("Filter on `{}` rejects {:?}: {}", self.path, value, err);
                return Ok(false);
            }
        };

        if self.state.mode.is_containment() && self.value_type != ValueType::String {
            warn!(
                target: "strainer::filter",
                property = %self.path,
                mode = %self.state.mode,
                value = %value,
                "comparing {} values as strings; {} is meant for string properties",
                self.value_type,
                self.state.mode
            );
        }

        Ok(match self.state.mode {
            FilterMode::Equals => self.equals(&value, filter_value),
            FilterMode::NotEquals => !self.equals(&value, filter_value),
            FilterMode::Contains => self.contains(&value, filter_value),
            FilterMode::NotContains => !self.contains(&value, filter_value),
            FilterMode::Greater => self.compare(&value, filter_value)? == Ordering::Greater,
            FilterMode::Smaller => self.compare(&value, filter_value)? == Ordering::Less,
            FilterMode::GreaterOrEqual => self.compare(&value, filter_value)? != Ordering::Less,
            FilterMode::SmallerOrEqual => self.compare(&value, filter_value)? != Ordering::Greater,
        })
    }

    /// Resolve this filter's property on `record` and test it.
    ///
    /// A path that does not exist on the record's type fails the filter instead of raising; accessor
    /// failures and comparator misconfiguration still propagate.
    pub fn test_entity(&self, record: &dyn Filterable) -> Result<bool, FilterError> {
        match self.path.resolve(record) {
            Ok(value) => self.test_property(value.as_ref()),
            Err(ResolveError::FieldNotFound { type_name, segment, .. }) => {
                debug!("Filter on `{}` rejects {} record: no accessor for `{}`", self.path, type_name, segment);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn coerce<'v>(&self, value: &'v Value) -> Result<Cow<'v, Value>, crate::value::CastError> {
        if ValueType::of(value) == self.value_type { Ok(Cow::Borrowed(value)) } else { value.cast_to(self.value_type).map(Cow::Owned) }
    }

    fn equals(&self, value: &Value, filter_value: &Value) -> bool {
        match (value, filter_value) {
            (Value::String(a), Value::String(b)) if self.state.ignore_case => a.to_lowercase() == b.to_lowercase(),
            (Value::String(a), b) => a.as_str() == b.to_string(),
            (a, b) => a == b,
        }
    }

    fn contains(&self, value: &Value, filter_value: &Value) -> bool {
        let (haystack, needle) = (value.to_string(), filter_value.to_string());
        if self.state.ignore_case { haystack.to_lowercase().contains(&needle.to_lowercase()) } else { haystack.contains(&needle) }
    }

    fn compare(&self, value: &Value, filter_value: &Value) -> Result<Ordering, FilterError> {
        let comparator = self
            .comparator
            .as_ref()
            .ok_or_else(|| FilterError::MissingComparator { property: self.path.to_string(), mode: self.state.mode })?;
        Ok(comparator.compare(value, filter_value))
    }
}

/// A live, observable filter on one record property.
///
/// A registered filter shares its registry's lock: a setter holds it until every listener, including
/// the predicate rebuild, has run, and the getters wait for it. A filter belongs to the registry that
/// registered it last.
#[derive(Clone)]
pub struct FieldFilter(Arc<Inner>);

struct Inner {
    path: FieldPath,
    value_type: ValueType,
    comparator: Option<Comparator>,
    scope: Mutex<Scope>,
    state: Mutex<FilterState>,
    changes: Broadcast<FilterChange>,
}

impl FieldFilter {
    /// A filter with an explicit comparator for the ordering modes
    pub fn new(property: impl Into<FieldPath>, value_type: ValueType, comparator: Comparator) -> Self {
        Self::build(property.into(), value_type, Some(comparator))
    }

    /// A filter that supports equality and containment only; ordering modes fail with
    /// `MissingComparator` when evaluated.
    pub fn unordered(property: impl Into<FieldPath>, value_type: ValueType) -> Self { Self::build(property.into(), value_type, None) }

    /// A string filter ordered lexicographically
    pub fn string(property: impl Into<FieldPath>) -> Self { Self::new(property, ValueType::String, Comparator::lexicographic()) }

    /// A numeric filter: values are widened to f64 and ordered numerically
    pub fn numeric(property: impl Into<FieldPath>) -> Self { Self::new(property, ValueType::F64, Comparator::numeric()) }

    pub fn ordinal(property: impl Into<FieldPath>) -> Self { Self::new(property, ValueType::Ordinal, Comparator::ordinal()) }

    pub fn boolean(property: impl Into<FieldPath>) -> Self { Self::new(property, ValueType::Bool, Comparator::boolean()) }

    fn build(path: FieldPath, value_type: ValueType, comparator: Option<Comparator>) -> Self {
        Self(Arc::new(Inner {
            path,
            value_type,
            comparator,
            scope: Mutex::new(Scope::new()),
            state: Mutex::new(FilterState::default()),
            changes: Broadcast::new(),
        }))
    }

    pub fn with_value(self, value: impl Into<Value>) -> Result<Self, FilterError> {
        self.set_value(value)?;
        Ok(self)
    }

    pub fn with_mode(self, mode: FilterMode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn with_ignore_case(self, ignore_case: bool) -> Self {
        self.set_ignore_case(ignore_case);
        self
    }

    pub fn property_name(&self) -> &str { self.0.path.as_str() }
    pub fn path(&self) -> &FieldPath { &self.0.path }
    pub fn value_type(&self) -> ValueType { self.0.value_type }
    pub fn comparator(&self) -> Option<&Comparator> { self.0.comparator.as_ref() }
    pub fn mode(&self) -> FilterMode { self.read(|state| state.mode) }
    pub fn filter_value(&self) -> Option<Value> { self.read(|state| state.value.clone()) }
    pub fn ignore_case(&self) -> bool { self.read(|state| state.ignore_case) }

    /// Whether two handles refer to the same filter
    pub fn ptr_eq(&self, other: &FieldFilter) -> bool { Arc::ptr_eq(&self.0, &other.0) }

    pub fn snapshot(&self) -> FilterSnapshot { self.in_scope(|| self.snapshot_held()) }

    /// Snapshot for a caller that already holds the registry scope
    pub(crate) fn snapshot_held(&self) -> FilterSnapshot {
        FilterSnapshot {
            path: self.0.path.clone(),
            value_type: self.0.value_type,
            comparator: self.0.comparator.clone(),
            state: self.0.state.lock().unwrap().clone(),
        }
    }

    pub fn test_property(&self, value: Option<&Value>) -> Result<bool, FilterError> { self.snapshot().test_property(value) }

    pub fn test_entity(&self, record: &dyn Filterable) -> Result<bool, FilterError> { self.snapshot().test_entity(record) }

    /// Set the reference value, coercing it to the declared type
    pub fn set_value(&self, value: impl Into<Value>) -> Result<(), FilterError> { self.set_filter_value(Some(value.into())) }

    /// Remove the reference value, making the filter inert
    pub fn clear_value(&self) {
        // Clearing never needs coercion
        let _ = self.set_filter_value(None);
    }

    pub fn set_filter_value(&self, value: Option<Value>) -> Result<(), FilterError> {
        let value = match value {
            Some(value) => Some(value.cast_to(self.0.value_type).map_err(|source| FilterError::ValueType {
                property: self.0.path.to_string(),
                expected: self.0.value_type,
                source,
            })?),
            None => None,
        };
        self.update(|state| {
            if state.value == value {
                return None;
            }
            let old = std::mem::replace(&mut state.value, value);
            Some(FilterChangeKind::Value { old, new: state.value.clone() })
        });
        Ok(())
    }

    pub fn set_mode(&self, mode: FilterMode) {
        if mode.is_ordering() && self.0.comparator.is_none() {
            warn!(target: "strainer::filter", property = %self.0.path, "{} set on a filter without a comparator; evaluation will fail", mode);
        }
        self.update(|state| {
            if state.mode == mode {
                return None;
            }
            let old = std::mem::replace(&mut state.mode, mode);
            Some(FilterChangeKind::Mode { old, new: mode })
        });
    }

    pub fn set_ignore_case(&self, ignore_case: bool) {
        self.update(|state| {
            if state.ignore_case == ignore_case {
                return None;
            }
            let old = std::mem::replace(&mut state.ignore_case, ignore_case);
            Some(FilterChangeKind::IgnoreCase { old, new: ignore_case })
        });
    }

    /// Apply a mutation and announce it, both inside the scope. The state lock is released before
    /// listeners run.
    fn update(&self, mutate: impl FnOnce(&mut FilterState) -> Option<FilterChangeKind>) {
        self.in_scope(|| {
            let kind = mutate(&mut *self.0.state.lock().unwrap());
            if let Some(kind) = kind {
                debug!("Filter on `{}` changed {}", self.0.path, kind.field_name());
                self.0.changes.send(FilterChange { property: self.0.path.to_string(), kind });
            }
        })
    }

    fn read<T>(&self, f: impl FnOnce(&FilterState) -> T) -> T { self.in_scope(|| f(&*self.0.state.lock().unwrap())) }

    fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        loop {
            let scope = self.0.scope.lock().unwrap().clone();
            let _held = scope.lock();
            // registration may have swapped the scope while we waited
            if self.0.scope.lock().unwrap().ptr_eq(&scope) {
                return f();
            }
        }
    }

    pub(crate) fn join_scope(&self, scope: &Scope) { *self.0.scope.lock().unwrap() = scope.clone(); }

    /// Give the filter a private scope again, unless another registry has taken it since
    pub(crate) fn leave_scope(&self, scope: &Scope) {
        let mut current = self.0.scope.lock().unwrap();
        if current.ptr_eq(scope) {
            *current = Scope::new();
        }
    }

    /// Listen-only access to this filter's change channel
    pub fn changes(&self) -> Ref<'_, FilterChange> { self.0.changes.reference() }

    pub fn listen<L>(&self, listener: L) -> ListenerGuard<FilterChange>
    where L: IntoBroadcastListener<FilterChange> {
        self.0.changes.reference().listen(listener)
    }

    /// Number of listeners currently observing this filter
    pub fn listener_count(&self) -> usize { self.0.changes.listener_count() }
}

impl Subscribe<FilterChange> for FieldFilter {
    fn subscribe<L>(&self, listener: L) -> SubscriptionGuard
    where L: IntoBroadcastListener<FilterChange> {
        self.listen(listener).into()
    }
}

impl std::fmt::Debug for FieldFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.state.lock().unwrap();
        f.debug_struct("FieldFilter")
            .field("property", &self.0.path.as_str())
            .field("value_type", &self.0.value_type)
            .field("mode", &state.mode)
            .field("value", &state.value)
            .field("ignore_case", &state.ignore_case)
            .field("ordered", &self.0.comparator.is_some())
            .finish()
    }
}
