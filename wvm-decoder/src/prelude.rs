//! Prelude module for wvm-decoder
//!
//! Unifies std and `no_std` imports for the rest of the crate.

#[cfg(feature = "std")]
pub use std::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

#[cfg(all(not(feature = "std"), feature = "alloc"))]
pub use alloc::{
    collections::BTreeMap,
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

pub use wvm_error::{codes, kinds, Error, ErrorCategory, Result};
