//! Tagged runtime values.
//!
//! Every value the engine pushes, pops, or stores carries its kind tag;
//! there is no aliasing of incompatible numeric representations anywhere in
//! the runtime.

use core::fmt;

use crate::prelude::*;
use wvm_format::types::ValueType;

/// A runtime value: kind tag plus payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// 128-bit vector
    V128([u8; 16]),
    /// Function reference (`None` is the null reference)
    FuncRef(Option<u32>),
}

impl Value {
    /// The kind of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::V128(_) => ValueType::V128,
            Value::FuncRef(_) => ValueType::FuncRef,
        }
    }

    /// The zero value of a kind (used to initialize locals and table slots)
    pub fn default_for(value_type: ValueType) -> Result<Value> {
        match value_type {
            ValueType::I32 => Ok(Value::I32(0)),
            ValueType::I64 => Ok(Value::I64(0)),
            ValueType::F32 => Ok(Value::F32(0.0)),
            ValueType::F64 => Ok(Value::F64(0.0)),
            ValueType::V128 => Ok(Value::V128([0; 16])),
            ValueType::FuncRef => Ok(Value::FuncRef(None)),
            ValueType::Empty => Err(Error::new(
                ErrorCategory::Validation,
                codes::INVALID_TYPE,
                "the empty kind has no value",
            )),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::I32(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "{}:i32", v),
            Value::I64(v) => write!(f, "{}:i64", v),
            Value::F32(v) => write!(f, "{}:f32", v),
            Value::F64(v) => write!(f, "{}:f64", v),
            Value::V128(v) => write!(f, "0x{:032x}:v128", u128::from_le_bytes(*v)),
            Value::FuncRef(Some(idx)) => write!(f, "{}:funcref", idx),
            Value::FuncRef(None) => write!(f, "null:funcref"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_know_their_kind() {
        assert_eq!(Value::I32(-1).value_type(), ValueType::I32);
        assert_eq!(Value::F64(0.5).value_type(), ValueType::F64);
        assert_eq!(Value::FuncRef(None).value_type(), ValueType::FuncRef);
    }

    #[test]
    fn default_values_are_zero() {
        assert_eq!(Value::default_for(ValueType::I64).unwrap(), Value::I64(0));
        assert_eq!(
            Value::default_for(ValueType::FuncRef).unwrap(),
            Value::FuncRef(None)
        );
        assert!(Value::default_for(ValueType::Empty).is_err());
    }

    #[test]
    fn display_renders_value_and_kind() {
        assert_eq!(format!("{}", Value::I32(42)), "42:i32");
        assert_eq!(format!("{}", Value::FuncRef(None)), "null:funcref");
    }
}
