// WVM - wvm-error
// Module: WVM Error Codes
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for WVM

// Parse error codes (1000-1999)
/// General parse error
pub const PARSE_ERROR: u16 = 1000;
/// Input ended in the middle of a construct
pub const UNEXPECTED_EOF: u16 = 1001;
/// LEB128 value wider than the declared bit width
pub const LEB_OVERFLOW: u16 = 1002;
/// Module magic bytes do not match
pub const INVALID_MAGIC: u16 = 1003;
/// Module version is not supported
pub const INVALID_VERSION: u16 = 1004;
/// Section decoder consumed a different byte count than declared
pub const SECTION_LENGTH_MISMATCH: u16 = 1005;
/// Section id outside the recognized 0-11 range
pub const UNSUPPORTED_SECTION_ID: u16 = 1006;
/// Invalid value-type or block-type tag
pub const INVALID_TYPE: u16 = 1007;
/// Name bytes are not valid UTF-8
pub const INVALID_UTF8: u16 = 1008;

// Validation error codes (2000-2999)
/// Block terminator with no open block on the stack
pub const BLOCK_STACK_UNDERFLOW: u16 = 2000;
/// `else` opcode without an enclosing `if`
pub const ELSE_MISMATCH: u16 = 2001;
/// Function body did not close every block with a terminator
pub const UNTERMINATED_FUNCTION: u16 = 2002;
/// Value kind differs from the declared kind
pub const TYPE_MISMATCH: u16 = 2003;
/// Function index outside the module's function space
pub const INVALID_FUNCTION_INDEX: u16 = 2004;
/// Entity index outside the corresponding entity space
pub const INVALID_INDEX: u16 = 2005;

// Resource error codes (3000-3999)
/// Table/memory size beyond capacity or out-of-range copy
pub const LIMIT_EXCEEDED: u16 = 3000;
/// Backing storage could not be allocated
pub const ALLOCATION_FAILED: u16 = 3001;
/// Access outside the backing storage bounds
pub const OUT_OF_BOUNDS: u16 = 3002;
/// Grow request beyond the declared maximum
pub const GROW_LIMIT: u16 = 3003;

// Runtime error codes (4000-4999)
/// Operand stack overflow
pub const STACK_OVERFLOW: u16 = 4000;
/// Operand stack underflow
pub const STACK_UNDERFLOW: u16 = 4001;
/// Call stack exhausted
pub const CALL_STACK_EXHAUSTED: u16 = 4002;
/// General execution error reported by the engine
pub const EXECUTION_ERROR: u16 = 4003;

// Import error codes (5000-5999)
/// Import kind tag outside the function/table/memory/global set
pub const UNSUPPORTED_IMPORT_KIND: u16 = 5000;
/// The import resolver could not provide the entity
pub const IMPORT_RESOLUTION_FAILED: u16 = 5001;
/// Resolved import does not satisfy the declared limits or type
pub const INCOMPATIBLE_IMPORT: u16 = 5002;
