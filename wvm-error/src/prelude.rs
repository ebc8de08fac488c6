// WVM - wvm-error
// Module: WVM Error Prelude
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Prelude module for wvm-error
//!
//! Provides a unified set of imports for both std and `no_std` environments
//! so individual modules do not repeat the feature dance.

#[cfg(feature = "std")]
pub use std::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

#[cfg(all(not(feature = "std"), feature = "alloc"))]
pub use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

pub use core::fmt::{self, Debug, Display};
