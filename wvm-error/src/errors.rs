// WVM - wvm-error
// Module: WVM Error Types
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Unified error type for WVM
//!
//! This module provides the error type used across the WVM codebase:
//! a category, a numeric code, and a formatted message.

use core::fmt;

use crate::prelude::String;

/// `Error` categories for WVM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Binary-format parse errors
    Parse = 1,
    /// Structural validation errors (control flow, types, indices)
    Validation = 2,
    /// Resource errors (memory, tables, allocation)
    Resource = 3,
    /// Runtime state errors (operand/call stacks)
    Runtime = 4,
    /// Import resolution errors
    Import = 5,
}

impl ErrorCategory {
    /// Human-readable name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Parse => "parse",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Resource => "resource",
            ErrorCategory::Runtime => "runtime",
            ErrorCategory::Import => "import",
        }
    }
}

/// WVM `Error` type
///
/// The main error type for the WVM loader. Every fallible operation returns
/// this through the [`Result`] alias. The message is formatted at the error
/// site and carries positional context (byte offset, section,
/// expected-vs-actual); there is no shared diagnostic buffer anywhere in the
/// system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code: u16,
    /// `Error` message
    pub message: String,
}

impl Error {
    /// Create a new error.
    #[must_use]
    pub fn new(category: ErrorCategory, code: u16, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    /// Check if this is a parse error
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        self.category == ErrorCategory::Parse
    }

    /// Check if this is a validation error
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        self.category == ErrorCategory::Validation
    }

    /// Check if this is a resource error
    #[must_use]
    pub fn is_resource_error(&self) -> bool {
        self.category == ErrorCategory::Resource
    }

    /// Check if this is a runtime error
    #[must_use]
    pub fn is_runtime_error(&self) -> bool {
        self.category == ErrorCategory::Runtime
    }

    /// Check if this is an import error
    #[must_use]
    pub fn is_import_error(&self) -> bool {
        self.category == ErrorCategory::Import
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {}",
            self.category.as_str(),
            self.code,
            self.message
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for WVM operations
pub type Result<T> = core::result::Result<T, Error>;
