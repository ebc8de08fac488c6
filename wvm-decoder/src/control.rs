//! Control-flow resolution.
//!
//! The binary encoding nests `block`/`loop`/`if` constructs implicitly, by
//! opcode pairing rather than explicit offsets, while the execution engine
//! needs every branch target in O(1). This module walks each locally defined
//! function's instruction stream exactly once, with an explicit stack of
//! in-progress blocks, and records every construct's entry, exit, `else`,
//! and branch-target offsets in a sparse offset-keyed map.

use crate::instructions::skip_immediates;
use crate::prelude::*;
use crate::sections::LocalFunction;
use wvm_format::binary;
use wvm_format::types::BlockType;

/// Kind of a nested control construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `block` construct: branches exit past the terminator
    Block,
    /// `loop` construct: branches re-enter the loop body
    Loop,
    /// `if` construct, with an optional `else` arm
    If,
}

/// Resolved metadata for one `block`/`loop`/`if` construct.
///
/// Created once during resolution and immutable afterward. Every offset
/// points into the module's own byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBlock {
    /// Construct kind
    pub kind: BlockKind,
    /// Block signature (inline kind or signature-table index)
    pub block_type: BlockType,
    /// Offset of the opening opcode
    pub start: u32,
    /// Offset of the matching terminator
    pub end: u32,
    /// Offset of the instruction following `else` (only for `if`)
    pub else_offset: Option<u32>,
    /// Branch-target offset: `start + 2` for a loop, the terminator offset
    /// otherwise
    pub br: u32,
}

/// Sparse lookup from a construct's opening-opcode offset to its resolved
/// metadata. Memory is proportional to the number of constructs, not to the
/// module size.
pub type ControlMap = BTreeMap<u32, ControlBlock>;

/// Maximum depth of nested control constructs per function
pub const MAX_BLOCK_DEPTH: usize = 0x1000;

struct OpenBlock {
    kind: BlockKind,
    block_type: BlockType,
    start: u32,
    else_offset: Option<u32>,
}

/// Resolve the control constructs of every locally defined function.
///
/// Each function body is visited exactly once; functions themselves never
/// enter the map (the implicit outer block's offsets already live on the
/// function record).
pub fn resolve_functions(bytes: &[u8], functions: &[LocalFunction]) -> Result<ControlMap> {
    let mut blocks = ControlMap::new();
    for function in functions {
        resolve_function(bytes, function.start, function.end, &mut blocks)?;
    }
    log::debug!(
        "resolved {} control blocks across {} functions",
        blocks.len(),
        functions.len()
    );
    Ok(blocks)
}

/// Resolve one function body spanning `[start, end]`, where `end` is the
/// offset of the function's own terminator.
pub fn resolve_function(
    bytes: &[u8],
    start: u32,
    end: u32,
    blocks: &mut ControlMap,
) -> Result<()> {
    if end as usize >= bytes.len() {
        return Err(kinds::unexpected_eof(end as usize, "function body"));
    }

    let mut stack: Vec<OpenBlock> = Vec::new();
    let mut pos = start as usize;
    let mut opcode = binary::UNREACHABLE;

    while pos <= end as usize {
        opcode = bytes[pos];
        match opcode {
            binary::BLOCK | binary::LOOP | binary::IF => {
                let kind = match opcode {
                    binary::BLOCK => BlockKind::Block,
                    binary::LOOP => BlockKind::Loop,
                    _ => BlockKind::If,
                };
                let (sig_byte, _) = binary::read_u8(bytes, pos + 1)?;
                let block_type = BlockType::from_byte(sig_byte)?;
                if stack.len() >= MAX_BLOCK_DEPTH {
                    return Err(kinds::limit_exceeded(format!(
                        "control blocks nested deeper than {} at offset {}",
                        MAX_BLOCK_DEPTH, pos
                    )));
                }
                stack.push(OpenBlock {
                    kind,
                    block_type,
                    start: pos as u32,
                    else_offset: None,
                });
            }
            binary::ELSE => {
                let top = stack.last_mut().ok_or_else(|| {
                    kinds::validation_error(
                        codes::ELSE_MISMATCH,
                        format!("else at offset {} with no enclosing block", pos),
                    )
                })?;
                if top.kind != BlockKind::If {
                    return Err(kinds::validation_error(
                        codes::ELSE_MISMATCH,
                        format!("else at offset {} not matched with if", pos),
                    ));
                }
                top.else_offset = Some(pos as u32 + 1);
            }
            binary::END => {
                if pos == end as usize {
                    // the function's implicit outer block closes here
                    // without a corresponding push
                } else {
                    let open = stack.pop().ok_or_else(|| {
                        kinds::validation_error(
                            codes::BLOCK_STACK_UNDERFLOW,
                            format!("block terminator at offset {} with empty stack", pos),
                        )
                    })?;
                    let br = if open.kind == BlockKind::Loop {
                        // re-enter just past the loop opcode and its
                        // signature byte
                        open.start + 2
                    } else {
                        pos as u32
                    };
                    blocks.insert(
                        open.start,
                        ControlBlock {
                            kind: open.kind,
                            block_type: open.block_type,
                            start: open.start,
                            end: pos as u32,
                            else_offset: open.else_offset,
                            br,
                        },
                    );
                }
            }
            _ => {}
        }
        pos = skip_immediates(bytes, pos)?;
    }

    if !stack.is_empty() {
        return Err(kinds::validation_error(
            codes::UNTERMINATED_FUNCTION,
            format!(
                "function body ending at offset {} left {} blocks open",
                end,
                stack.len()
            ),
        ));
    }
    if opcode != binary::END {
        return Err(kinds::validation_error(
            codes::UNTERMINATED_FUNCTION,
            format!("function body did not end with the terminator at offset {}", end),
        ));
    }

    Ok(())
}
