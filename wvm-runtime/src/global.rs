//! Global variables.

use crate::prelude::*;
use crate::values::Value;
use wvm_format::types::GlobalType;

/// A global variable instance: a tagged value plus a mutability flag.
///
/// Created during import binding or global-section instantiation; only the
/// execution engine mutates it afterward, and only if `mutable`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Global {
    /// Value kind and mutability
    pub global_type: GlobalType,
    value: Value,
}

impl Global {
    /// Create a global, checking the initial value against the declared kind.
    pub fn new(global_type: GlobalType, value: Value) -> Result<Self> {
        if value.value_type() != global_type.value_type {
            return Err(Error::new(
                ErrorCategory::Validation,
                codes::TYPE_MISMATCH,
                format!(
                    "global declared {} but initialized with {}",
                    global_type.value_type,
                    value.value_type()
                ),
            ));
        }
        Ok(Self { global_type, value })
    }

    /// The current value
    pub fn get(&self) -> Value {
        self.value
    }

    /// Replace the value; fails for immutable globals or a kind mismatch.
    pub fn set(&mut self, value: Value) -> Result<()> {
        if !self.global_type.mutable {
            return Err(Error::new(
                ErrorCategory::Validation,
                codes::TYPE_MISMATCH,
                "cannot set an immutable global",
            ));
        }
        if value.value_type() != self.global_type.value_type {
            return Err(Error::new(
                ErrorCategory::Validation,
                codes::TYPE_MISMATCH,
                format!(
                    "global holds {} but was set to {}",
                    self.global_type.value_type,
                    value.value_type()
                ),
            ));
        }
        self.value = value;
        Ok(())
    }
}
