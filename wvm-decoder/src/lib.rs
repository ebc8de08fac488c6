//! WebAssembly module decoder for the WVM loader.
//!
//! Turns a raw module byte buffer into a validated, format-level [`Module`]:
//! header verification, per-section payload decoding, and the single-pass
//! control-flow resolution that precomputes every `block`/`loop`/`if`
//! construct's entry, exit, `else`, and branch-target offsets so the
//! execution engine can branch in O(1).
//!
//! The decoder stores byte offsets into the caller's buffer rather than
//! copies; the buffer must stay immutable for the lifetime of the decoded
//! module.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
extern crate alloc;

pub mod control;
pub mod instructions;
pub mod module;
pub mod prelude;
pub mod sections;

pub use control::{BlockKind, ControlBlock, ControlMap};
pub use instructions::{immediate_kind, skip_immediates, ImmediateKind};
pub use module::{Module, SegmentPolicy};
pub use sections::{
    DataSegment, ElementSegment, Export, ExportKind, GlobalDecl, Import, ImportDesc, InitExpr,
    LocalFunction, MemoryDecl, TableDecl,
};
