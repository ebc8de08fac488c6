//! Prelude module for wvm-runtime
//!
//! Unifies std and `no_std` imports for the rest of the crate.

#[cfg(feature = "std")]
pub use std::{
    format,
    string::{String, ToString},
    sync::Arc,
    vec,
    vec::Vec,
};

#[cfg(all(not(feature = "std"), feature = "alloc"))]
pub use alloc::{
    format,
    string::{String, ToString},
    sync::Arc,
    vec,
    vec::Vec,
};

pub use wvm_error::{codes, kinds, Error, ErrorCategory, Result};
