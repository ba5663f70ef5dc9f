//! Record types and their accessor tables.
//!
//! A record type owns one [`Accessors`] table, built once and reused for every lookup. The table maps
//! field names to getter functions, which is what the path resolver walks instead of reflecting on
//! the type at runtime. `#[derive(Record)]` generates the table from a struct's named fields; hand
//! written tables can additionally register computed accessors that may fail.

use indexmap::IndexMap;

use crate::error::AccessorError;
use crate::value::{Value, ValueType};

/// What an accessor produces: a terminal value, a nested record to continue walking, or null.
pub enum Field<'a> {
    Value(Value),
    Record(&'a dyn Filterable),
    Null,
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Field::Record(record) => f.debug_tuple("Record").field(&record.type_name()).finish(),
            Field::Null => f.write_str("Null"),
        }
    }
}

/// The declared type of a field, known without an instance.
#[derive(Clone, Copy)]
pub enum FieldType {
    Scalar(ValueType),
    Record(fn() -> &'static dyn RecordSchema),
}

impl FieldType {
    /// The declared type of a field holding a nested record `R`
    pub fn record<R: Record>() -> Self { FieldType::Record(schema_of::<R>) }

    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            FieldType::Scalar(ty) => Some(*ty),
            FieldType::Record(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Scalar(ty) => ty.name(),
            FieldType::Record(schema) => schema().type_name(),
        }
    }
}

fn schema_of<R: Record>() -> &'static dyn RecordSchema { R::accessors() }

impl std::fmt::Debug for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Scalar(ty) => f.debug_tuple("Scalar").field(ty).finish(),
            FieldType::Record(schema) => f.debug_tuple("Record").field(&schema().type_name()).finish(),
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Scalar(a), FieldType::Scalar(b)) => a == b,
            (FieldType::Record(a), FieldType::Record(b)) => std::ptr::addr_eq(a() as *const dyn RecordSchema, b() as *const dyn RecordSchema),
            _ => false,
        }
    }
}

/// Type-level view of a record type: which fields exist and what they hold.
pub trait RecordSchema: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn field_type(&self, name: &str) -> Option<FieldType>;
    fn field_names(&self) -> Vec<&'static str>;
}

/// Instance-level, object safe view of a record used by the path resolver.
pub trait Filterable {
    fn type_name(&self) -> &'static str;
    /// `None` when the type has no accessor called `name`
    fn field(&self, name: &str) -> Option<Result<Field<'_>, AccessorError>>;
}

/// A record type with a static accessor table.
pub trait Record: Send + Sync + 'static {
    fn accessors() -> &'static Accessors<Self>
    where Self: Sized;
}

impl<R: Record> Filterable for R {
    fn type_name(&self) -> &'static str { R::accessors().type_name }

    fn field(&self, name: &str) -> Option<Result<Field<'_>, AccessorError>> { R::accessors().get(self, name) }
}

type Getter<R> = Box<dyn for<'a> Fn(&'a R) -> Result<Field<'a>, AccessorError> + Send + Sync>;

struct Accessor<R> {
    field_type: FieldType,
    getter: Getter<R>,
}

/// The accessor table of record type `R`: field name to declared type and getter.
pub struct Accessors<R: 'static> {
    type_name: &'static str,
    fields: IndexMap<&'static str, Accessor<R>>,
}

impl<R: 'static> Accessors<R> {
    pub fn new(type_name: &'static str) -> Self { Self { type_name, fields: IndexMap::new() } }

    /// Register a plain field projection. The declared type comes from the field's Rust type.
    pub fn property<P, F>(self, name: &'static str, project: F) -> Self
    where
        P: Property + 'static,
        F: for<'a> Fn(&'a R) -> &'a P + Send + Sync + 'static,
    {
        self.computed(name, P::field_type(), move |record| Ok(project(record).to_field()))
    }

    /// Register an accessor that computes its field and may fail.
    pub fn computed<F>(mut self, name: &'static str, field_type: FieldType, getter: F) -> Self
    where F: for<'a> Fn(&'a R) -> Result<Field<'a>, AccessorError> + Send + Sync + 'static {
        self.fields.insert(name, Accessor { field_type, getter: Box::new(getter) });
        self
    }

    pub fn type_name(&self) -> &'static str { self.type_name }

    pub fn contains(&self, name: &str) -> bool { self.fields.contains_key(name) }

    /// Invoke the accessor for `name` on `record`
    pub fn get<'a>(&self, record: &'a R, name: &str) -> Option<Result<Field<'a>, AccessorError>> {
        self.fields.get(name).map(|accessor| (accessor.getter)(record))
    }
}

impl<R: 'static> RecordSchema for Accessors<R> {
    fn type_name(&self) -> &'static str { self.type_name }

    fn field_type(&self, name: &str) -> Option<FieldType> { self.fields.get(name).map(|accessor| accessor.field_type) }

    fn field_names(&self) -> Vec<&'static str> { self.fields.keys().copied().collect() }
}

impl<R: 'static> std::fmt::Debug for Accessors<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessors")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.iter().map(|(name, accessor)| (*name, accessor.field_type)).collect::<Vec<_>>())
            .finish()
    }
}

/// Conversion from a Rust field type into what accessors hand to the resolver.
///
/// `#[derive(Record)]` implements this for the deriving struct so it can be nested in other records.
/// A raw [`Value`] field has no fixed type and is not a `Property`; register it with
/// [`Accessors::computed`] and the type it actually holds.
pub trait Property {
    fn field_type() -> FieldType;
    fn to_field(&self) -> Field<'_>;
}

impl Property for String {
    fn field_type() -> FieldType { FieldType::Scalar(ValueType::String) }
    fn to_field(&self) -> Field<'_> { Field::Value(Value::String(self.clone())) }
}

impl Property for &'static str {
    fn field_type() -> FieldType { FieldType::Scalar(ValueType::String) }
    fn to_field(&self) -> Field<'_> { Field::Value(Value::String(self.to_string())) }
}

impl Property for char {
    fn field_type() -> FieldType { FieldType::Scalar(ValueType::String) }
    fn to_field(&self) -> Field<'_> { Field::Value(Value::String(self.to_string())) }
}

impl Property for bool {
    fn field_type() -> FieldType { FieldType::Scalar(ValueType::Bool) }
    fn to_field(&self) -> Field<'_> { Field::Value(Value::Bool(*self)) }
}

macro_rules! impl_property_scalar {
    ($variant:ident => $($ty:ty),*) => {
        $(
            impl Property for $ty {
                fn field_type() -> FieldType { FieldType::Scalar(ValueType::$variant) }
                fn to_field(&self) -> Field<'_> { Field::Value(Value::from(*self)) }
            }
        )*
    };
}
impl_property_scalar!(I64 => i8, i16, i32, i64, u8, u16, u32);
impl_property_scalar!(F64 => f32, f64);

impl<T: Property> Property for Option<T> {
    fn field_type() -> FieldType { T::field_type() }
    fn to_field(&self) -> Field<'_> {
        match self {
            Some(value) => value.to_field(),
            None => Field::Null,
        }
    }
}

impl<T: Property> Property for Box<T> {
    fn field_type() -> FieldType { T::field_type() }
    fn to_field(&self) -> Field<'_> { (**self).to_field() }
}
