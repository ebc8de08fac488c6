// WVM - wvm-error
// Module: WVM Error Kind Constructors
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Helper constructors for the error kinds raised by the loader.
//!
//! These keep the call sites in the decoder and runtime crates short while
//! ensuring every kind lands in the right category/code pair.

use crate::codes;
use crate::errors::{Error, ErrorCategory};
use crate::prelude::{format, String};

/// General parse error with a formatted message
pub fn parse_error(message: impl Into<String>) -> Error {
    Error::new(ErrorCategory::Parse, codes::PARSE_ERROR, message)
}

/// Input ended while reading `what` at `offset`
pub fn unexpected_eof(offset: usize, what: &str) -> Error {
    Error::new(
        ErrorCategory::Parse,
        codes::UNEXPECTED_EOF,
        format!("unexpected end of input at offset {} while reading {}", offset, what),
    )
}

/// LEB128 value at `offset` does not fit in `max_bits` bits
pub fn leb_overflow(offset: usize, max_bits: u32) -> Error {
    Error::new(
        ErrorCategory::Parse,
        codes::LEB_OVERFLOW,
        format!("LEB128 value at offset {} overflows {} bits", offset, max_bits),
    )
}

/// Validation error with a formatted message
pub fn validation_error(code: u16, message: impl Into<String>) -> Error {
    Error::new(ErrorCategory::Validation, code, message)
}

/// Table/memory capacity or copy-range violation
pub fn limit_exceeded(message: impl Into<String>) -> Error {
    Error::new(ErrorCategory::Resource, codes::LIMIT_EXCEEDED, message)
}

/// Backing storage allocation failed
pub fn allocation_failed(what: &str, bytes: usize) -> Error {
    Error::new(
        ErrorCategory::Resource,
        codes::ALLOCATION_FAILED,
        format!("could not allocate {} bytes for {}", bytes, what),
    )
}

/// The import resolver could not provide `module`.`name`
pub fn import_resolution_failed(module: &str, name: &str, reason: &str) -> Error {
    Error::new(
        ErrorCategory::Import,
        codes::IMPORT_RESOLUTION_FAILED,
        format!("cannot resolve import {}.{}: {}", module, name, reason),
    )
}

/// Import kind tag outside the supported set
pub fn unsupported_import_kind(kind: u8) -> Error {
    Error::new(
        ErrorCategory::Import,
        codes::UNSUPPORTED_IMPORT_KIND,
        format!("import of kind 0x{:02x} not supported", kind),
    )
}

/// Operand stack overflow
pub fn stack_overflow() -> Error {
    Error::new(
        ErrorCategory::Runtime,
        codes::STACK_OVERFLOW,
        "operand stack overflow",
    )
}

/// Operand stack underflow
pub fn stack_underflow() -> Error {
    Error::new(
        ErrorCategory::Runtime,
        codes::STACK_UNDERFLOW,
        "operand stack underflow",
    )
}
