// WVM - wvm-error
// Module: WVM Error Handling
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WVM error handling library
//!
//! This library provides the error handling system shared by every crate in
//! the WVM loader. Errors carry a category, a numeric code, and a formatted
//! message with enough positional detail (byte offset, section,
//! expected-vs-actual) to diagnose the malformed construct that produced
//! them.
//!
//! # Error categories
//!
//! Errors are organized into categories, each with its own range of codes:
//!
//! - Parse errors (1000-1999): header, section framing, LEB128 encoding
//! - Validation errors (2000-2999): control-flow resolution, type checks
//! - Resource errors (3000-3999): memory/table limits, allocation
//! - Runtime errors (4000-4999): operand/call stack state
//! - Import errors (5000-5999): unresolvable or unsupported imports
//!
//! # Usage
//!
//! ```
//! use wvm_error::{codes, Error, ErrorCategory};
//!
//! let error = Error::new(
//!     ErrorCategory::Parse,
//!     codes::INVALID_MAGIC,
//!     "wrong module magic 0xdeadbeef",
//! );
//! assert!(error.is_parse_error());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
extern crate alloc;

/// Error codes for WVM
pub mod codes;
/// Error and error handling types
pub mod errors;
/// Helper constructors for common error kinds
pub mod kinds;
/// Unified imports for std and `no_std` builds
pub mod prelude;

pub use errors::{Error, ErrorCategory, Result};
