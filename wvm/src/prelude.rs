//! Prelude module for wvm
//!
//! One import for embedders: the loader entry point, the collaborator
//! traits, and the data model the engine reads.

pub use crate::load_module;
pub use wvm_decoder::{BlockKind, ControlBlock, ControlMap, Export, ExportKind, SegmentPolicy};
pub use wvm_error::{Error, ErrorCategory, Result};
pub use wvm_format::types::{BlockType, FuncType, GlobalType, Limits, ValueType};
pub use wvm_runtime::{
    Engine, Extern, Frame, FrameTarget, FuncKind, Function, Global, HostFunc, ImportResolver,
    LoaderConfig, Memory, Module, NoImports, RuntimeState, Table, Value,
};
