//! Runtime data model and module instantiation for the WVM loader.
//!
//! This crate owns everything the execution engine reads and writes at run
//! time: tagged values, linear memory, the funcref table, globals, the
//! operand and call stacks, and the aggregate [`Module`] instance. It also
//! performs instantiation — binding imports through an injected
//! [`ImportResolver`], evaluating constant initializer expressions through
//! the module's own operand stack, and applying element/data segments with
//! full bounds checks — and hands the finished module to an external
//! [`Engine`] for execution.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
extern crate alloc;

pub mod config;
pub mod global;
pub mod host;
pub mod memory;
pub mod module;
pub mod prelude;
pub mod stack;
pub mod table;
pub mod values;

pub use config::LoaderConfig;
pub use global::Global;
pub use host::{Extern, HostFunc, ImportResolver, NoImports};
pub use memory::Memory;
pub use module::{Engine, FuncKind, Function, Module};
pub use stack::{Frame, FrameTarget, RuntimeState};
pub use table::Table;
pub use values::Value;
