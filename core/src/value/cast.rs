use crate::value::{Value, ValueType};

#[derive(Debug, Clone, PartialEq)]
pub enum CastError {
    /// Cannot cast from source type to target type
    IncompatibleTypes { from: ValueType, to: ValueType },
    /// A float with a fractional part cannot become an integer without losing information
    FractionalValue { value: String, target_type: ValueType },
    /// Numeric overflow when casting between numeric types
    NumericOverflow { value: String, target_type: ValueType },
}

impl std::fmt::Display for CastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CastError::IncompatibleTypes { from, to } => {
                write!(f, "Cannot cast from {:?} to {:?}", from, to)
            }
            CastError::FractionalValue { value, target_type } => {
                write!(f, "Fractional value '{}' cannot be represented as {:?}", value, target_type)
            }
            CastError::NumericOverflow { value, target_type } => {
                write!(f, "Numeric overflow: '{}' cannot fit in {:?}", value, target_type)
            }
        }
    }
}

impl std::error::Error for CastError {}

impl Value {
    /// Cast this value to the specified target type.
    ///
    /// Casting is only allowed within the numeric family (I64, F64). Cross-family casts such as
    /// string to number are rejected rather than parsed: a record value whose type disagrees with a
    /// filter's declared type is a data-shape mismatch, not something to guess at.
    pub fn cast_to(&self, target_type: ValueType) -> Result<Value, CastError> {
        let source_type = ValueType::of(self);

        if source_type == target_type {
            return Ok(self.clone());
        }

        match (self, target_type) {
            (Value::I64(n), ValueType::F64) => Ok(Value::F64(*n as f64)),
            (Value::F64(n), ValueType::I64) => {
                if !n.is_finite() || *n < i64::MIN as f64 || *n >= i64::MAX as f64 {
                    Err(CastError::NumericOverflow { value: n.to_string(), target_type: ValueType::I64 })
                } else if n.fract() != 0.0 {
                    Err(CastError::FractionalValue { value: n.to_string(), target_type: ValueType::I64 })
                } else {
                    Ok(Value::I64(*n as i64))
                }
            }
            _ => Err(CastError::IncompatibleTypes { from: source_type, to: target_type }),
        }
    }
}
