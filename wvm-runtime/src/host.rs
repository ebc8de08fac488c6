//! Host binding: the injected import-resolution capability.
//!
//! The loader never touches a dynamic-library mechanism; the caller supplies
//! an [`ImportResolver`] and the host environment becomes a pluggable
//! collaborator.

use core::fmt;

use crate::memory::Memory;
use crate::prelude::*;
use crate::table::Table;
use crate::values::Value;

/// Host-provided implementation of an imported function.
///
/// The engine calls it with the argument values and receives the optional
/// result value.
pub type HostFunc = Arc<dyn Fn(&mut [Value]) -> Result<Option<Value>> + Send + Sync>;

/// A typed entity provided by the host for one import entry.
pub enum Extern {
    /// A host function
    Func(HostFunc),
    /// Host-provided table storage
    Table(Table),
    /// Host-provided memory storage
    Memory(Memory),
    /// A host-provided global's initial value
    Global(Value),
}

impl fmt::Debug for Extern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extern::Func(_) => f.write_str("Extern::Func(..)"),
            Extern::Table(table) => f.debug_tuple("Extern::Table").field(table).finish(),
            Extern::Memory(memory) => f.debug_tuple("Extern::Memory").field(memory).finish(),
            Extern::Global(value) => f.debug_tuple("Extern::Global").field(value).finish(),
        }
    }
}

/// Resolves `module.name` import references to host entities.
///
/// A resolution failure (an `Err` with a human-readable reason) aborts the
/// load: a module referencing an unresolvable import cannot be executed.
pub trait ImportResolver {
    /// Resolve one import by host/module name and member name.
    fn resolve(&self, module: &str, name: &str) -> Result<Extern>;
}

/// A resolver that rejects every import; the right collaborator for modules
/// that are expected to be self-contained.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&self, module: &str, name: &str) -> Result<Extern> {
        Err(kinds::import_resolution_failed(
            module,
            name,
            "this module was loaded without host imports",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_imports_rejects_everything() {
        let err = NoImports.resolve("env", "print").unwrap_err();
        assert!(err.is_import_error());
        assert!(err.message.contains("env.print"));
    }
}
