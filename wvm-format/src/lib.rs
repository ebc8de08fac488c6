//! WebAssembly binary format handling for the WVM loader.
//!
//! This crate owns everything that is a property of the wire format rather
//! than of a decoded module: the header constants, section ids, type tags and
//! opcode values, the LEB128 variable-length integer codec (read and write),
//! length-prefixed strings, fixed-width float reads, and the core type model
//! (`ValueType`, `Limits`, `BlockType`, `FuncType` with its signature
//! fingerprint).
//!
//! Everything here is pure and deterministic over `(bytes, pos)`; cursors are
//! advanced past exactly what was consumed.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
extern crate alloc;

pub mod binary;
pub mod prelude;
pub mod types;

pub use types::{BlockType, FuncType, GlobalType, Limits, ValueType};
