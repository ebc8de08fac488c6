//! Function-reference table.
//!
//! A growable, typed array of funcref slots. Growth never exceeds the
//! declared maximum, capped at the implementation ceiling of 65536 slots.

use crate::prelude::*;
use wvm_format::binary::MAX_TABLE_SLOTS;
use wvm_format::types::{Limits, ValueType};

/// A table instance holding function indices (`None` is a null slot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Element kind (function references only)
    pub element_type: ValueType,
    /// Declared slot limits (maximum already clamped by the decoder)
    pub limits: Limits,
    entries: Vec<Option<u32>>,
}

impl Table {
    /// Create a table sized to its declared minimum, all slots null.
    pub fn new(element_type: ValueType, limits: Limits) -> Result<Self> {
        if element_type != ValueType::FuncRef {
            return Err(Error::new(
                ErrorCategory::Validation,
                codes::INVALID_TYPE,
                format!("table element type {} unsupported", element_type),
            ));
        }

        let slots = limits.min as usize;
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(slots)
            .map_err(|_| kinds::allocation_failed("table entries", slots * 4))?;
        entries.resize(slots, None);

        Ok(Self {
            element_type,
            limits,
            entries,
        })
    }

    /// Current slot count
    pub fn size(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Grow by `delta` slots, returning the previous slot count.
    pub fn grow(&mut self, delta: u32) -> Result<u32> {
        let old_size = self.size();
        let new_size = u64::from(old_size) + u64::from(delta);
        let max = self.limits.max_or_ceiling(MAX_TABLE_SLOTS);
        if new_size > u64::from(max) {
            return Err(Error::new(
                ErrorCategory::Resource,
                codes::GROW_LIMIT,
                format!(
                    "cannot grow table from {} to {} slots, maximum is {}",
                    old_size, new_size, max
                ),
            ));
        }
        self.entries.resize(new_size as usize, None);
        Ok(old_size)
    }

    /// The function index stored at `slot`
    pub fn get(&self, slot: u32) -> Result<Option<u32>> {
        self.entries
            .get(slot as usize)
            .copied()
            .ok_or_else(|| self.out_of_bounds(slot))
    }

    /// Store a function index at `slot`
    pub fn set(&mut self, slot: u32, func_idx: Option<u32>) -> Result<()> {
        let size = self.size();
        match self.entries.get_mut(slot as usize) {
            Some(entry) => {
                *entry = func_idx;
                Ok(())
            }
            None => Err(Error::new(
                ErrorCategory::Resource,
                codes::OUT_OF_BOUNDS,
                format!("table slot {} exceeds size {}", slot, size),
            )),
        }
    }

    fn out_of_bounds(&self, slot: u32) -> Error {
        Error::new(
            ErrorCategory::Resource,
            codes::OUT_OF_BOUNDS,
            format!("table slot {} exceeds size {}", slot, self.size()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> Table {
        Table::new(ValueType::FuncRef, Limits { min: 2, max: Some(4) }).unwrap()
    }

    #[test]
    fn slots_start_null() {
        let table = small_table();
        assert_eq!(table.size(), 2);
        assert_eq!(table.get(0).unwrap(), None);
        assert_eq!(table.get(1).unwrap(), None);
        assert!(table.get(2).is_err());
    }

    #[test]
    fn set_and_get() {
        let mut table = small_table();
        table.set(1, Some(7)).unwrap();
        assert_eq!(table.get(1).unwrap(), Some(7));
        assert!(table.set(2, Some(0)).is_err());
    }

    #[test]
    fn grow_respects_maximum() {
        let mut table = small_table();
        assert_eq!(table.grow(2).unwrap(), 2);
        assert_eq!(table.size(), 4);
        assert_eq!(table.grow(1).unwrap_err().code, codes::GROW_LIMIT);
    }

    #[test]
    fn only_funcref_tables_are_supported() {
        let err = Table::new(ValueType::I32, Limits { min: 1, max: None }).unwrap_err();
        assert_eq!(err.code, codes::INVALID_TYPE);
    }
}
