mod cast;

pub use cast::CastError;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A field value as seen by filters.
///
/// Nulls never appear inside a `Value`; an absent value is `Option::None` at every API boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    // Numbers
    I64(i64),
    F64(f64),

    Bool(bool),
    String(String),
    /// A comparable position in some ordered domain (enum discriminant, epoch millis, ...)
    Ordinal(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    I64,
    F64,
    Bool,
    String,
    Ordinal,
}

impl ValueType {
    pub fn of(v: &Value) -> Self {
        match v {
            Value::I64(_) => ValueType::I64,
            Value::F64(_) => ValueType::F64,
            Value::Bool(_) => ValueType::Bool,
            Value::String(_) => ValueType::String,
            Value::Ordinal(_) => ValueType::Ordinal,
        }
    }

    pub fn is_numeric(&self) -> bool { matches!(self, ValueType::I64 | ValueType::F64) }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::I64 => "I64",
            ValueType::F64 => "F64",
            ValueType::Bool => "Bool",
            ValueType::String => "String",
            ValueType::Ordinal => "Ordinal",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl Value {
    pub fn value_type(&self) -> ValueType { ValueType::of(self) }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(n) | Value::Ordinal(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view with widening to f64. Ordinals count as numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I64(n) | Value::Ordinal(n) => Some(*n as f64),
            Value::F64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// The string representation used by containment checks.
/// Floats always carry a decimal point, so `30.0` renders as `30.0` rather than `30`.
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::I64(int) => write!(f, "{}", int),
            Value::F64(float) => write!(f, "{:?}", float),
            Value::Bool(bool) => write!(f, "{}", bool),
            Value::String(string) => f.write_str(string),
            Value::Ordinal(ord) => write!(f, "{}", ord),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self { Value::String(value) }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self { Value::String(value.to_string()) }
}
impl From<&String> for Value {
    fn from(value: &String) -> Self { Value::String(value.clone()) }
}
impl From<char> for Value {
    fn from(value: char) -> Self { Value::String(value.to_string()) }
}
impl From<bool> for Value {
    fn from(value: bool) -> Self { Value::Bool(value) }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self { Value::F64(value) }
}
impl From<f32> for Value {
    fn from(value: f32) -> Self { Value::F64(value as f64) }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self { Value::I64(value as i64) }
            }
        )*
    };
}
impl_from_int!(i8, i16, i32, i64, u8, u16, u32);
