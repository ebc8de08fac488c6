//! WebAssembly Virtual Machine loader (WVM)
//!
//! A pure Rust loader for WebAssembly modules feeding a stack-based virtual
//! machine: binary decoding, single-pass control-flow resolution, and the
//! runtime data model (values, linear memory, tables, globals, stacks) the
//! execution engine consumes.
//!
//! The instruction-dispatch loop itself is an external collaborator behind
//! the [`Engine`] trait, and host imports are bound through the injected
//! [`ImportResolver`] capability.
//!
//! ## Quick start
//!
//! ```
//! use wvm::{load_module, LoaderConfig, NoImports};
//!
//! // \0asm header, version 1: the empty module
//! let bytes = vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
//! let module = load_module(bytes, &NoImports, &LoaderConfig::default()).unwrap();
//! assert!(module.exports.is_empty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
extern crate alloc;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use alloc::vec::Vec;

// Include prelude module for consistent imports across crates
pub mod prelude;

// Public exports with careful naming to avoid conflicts
pub use wvm_decoder::{
    BlockKind, ControlBlock, ControlMap, Export, ExportKind, SegmentPolicy,
};
pub use wvm_error::{codes, Error, ErrorCategory, Result};
pub use wvm_format::types::{BlockType, FuncType, GlobalType, Limits, ValueType};
pub use wvm_runtime::{
    Engine, Extern, Frame, FrameTarget, FuncKind, Function, Global, HostFunc, ImportResolver,
    LoaderConfig, Memory, Module, NoImports, RuntimeState, Table, Value,
};

/// Load a module: decode the buffer, bind imports, allocate storage, and
/// initialize globals, elements, and data.
///
/// If the module declares a start function, invoke it afterward through
/// [`Module::run_start`] with your [`Engine`].
pub fn load_module(
    bytes: Vec<u8>,
    resolver: &dyn ImportResolver,
    config: &LoaderConfig,
) -> Result<Module> {
    Module::load(bytes, resolver, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_loads_a_module() {
        let bytes = wat::parse_str(
            r#"(module (func (result i32) i32.const 3) (export "three" (func 0)))"#,
        )
        .unwrap();
        let module = load_module(bytes, &NoImports, &LoaderConfig::default()).unwrap();
        assert_eq!(module.exported_func("three"), Some(0));
    }
}
