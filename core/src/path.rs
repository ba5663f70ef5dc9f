//! Dotted field paths such as `artist.country.code`, resolved against records through their
//! accessor tables.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ResolveError;
use crate::record::{Field, FieldType, Filterable, Record, RecordSchema};
use crate::value::{Value, ValueType};

/// A parsed dotted path. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    path: Arc<str>,
    segments: Arc<[String]>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Self { Self { path: Arc::from(path), segments: path.split('.').map(str::to_string).collect() } }

    pub fn as_str(&self) -> &str { &self.path }
    pub fn segments(&self) -> &[String] { &self.segments }
    pub fn first(&self) -> &str { &self.segments[0] }
    pub fn is_simple(&self) -> bool { self.segments.len() == 1 }
    pub fn len(&self) -> usize { self.segments.len() }

    /// Resolve the terminal value of this path on `record`. `Ok(None)` means the value is null.
    pub fn resolve(&self, record: &dyn Filterable) -> Result<Option<Value>, ResolveError> { self.resolve_from(0, record) }

    fn resolve_from(&self, depth: usize, record: &dyn Filterable) -> Result<Option<Value>, ResolveError> {
        let segment = &self.segments[depth];
        let field = match record.field(segment) {
            Some(Ok(field)) => field,
            Some(Err(source)) => {
                return Err(ResolveError::AccessorInvocation {
                    type_name: record.type_name().to_string(),
                    segment: segment.clone(),
                    path: self.path.to_string(),
                    source,
                });
            }
            None => return Err(self.field_not_found(record.type_name(), segment)),
        };

        let last = depth + 1 == self.segments.len();
        match field {
            // A null anywhere along the chain makes the whole path null
            Field::Null => Ok(None),
            Field::Value(value) if last => Ok(Some(value)),
            // Scalars have no accessors, so the next segment cannot exist
            Field::Value(value) => Err(self.field_not_found(ValueType::of(&value).name(), &self.segments[depth + 1])),
            Field::Record(nested) if last => Err(ResolveError::NotAValue { type_name: nested.type_name().to_string(), path: self.path.to_string() }),
            Field::Record(nested) => self.resolve_from(depth + 1, nested),
        }
    }

    /// Resolve the declared terminal type of this path, walking accessor tables without an instance.
    pub fn resolve_type(&self, schema: &dyn RecordSchema) -> Result<FieldType, ResolveError> {
        let mut schema = schema;
        let mut segments = self.segments.iter().peekable();
        while let Some(segment) = segments.next() {
            let field_type = schema.field_type(segment).ok_or_else(|| self.field_not_found(schema.type_name(), segment))?;
            let Some(next) = segments.peek() else {
                return Ok(field_type);
            };
            match field_type {
                FieldType::Record(nested) => schema = nested(),
                FieldType::Scalar(ty) => return Err(self.field_not_found(ty.name(), next)),
            }
        }
        unreachable!("a FieldPath always has at least one segment")
    }

    fn field_not_found(&self, type_name: &str, segment: &str) -> ResolveError {
        ResolveError::FieldNotFound { type_name: type_name.to_string(), segment: segment.to_string(), path: self.path.to_string() }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(&self.path) }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::parse(s)) }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self { Self::parse(path) }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self { Self::parse(&path) }
}

/// Resolve a dotted `path` against `record`, returning the terminal value (`None` for null).
pub fn resolve(path: &str, record: &dyn Filterable) -> Result<Option<Value>, ResolveError> { FieldPath::parse(path).resolve(record) }

/// Resolve the declared terminal type of `path` on the type described by `schema`.
pub fn resolve_type(path: &str, schema: &dyn RecordSchema) -> Result<FieldType, ResolveError> { FieldPath::parse(path).resolve_type(schema) }

/// Resolve the declared terminal type of `path` on record type `R`.
pub fn resolve_type_of<R: Record>(path: &str) -> Result<FieldType, ResolveError> { resolve_type(path, R::accessors()) }
