//! Section parsers for the WebAssembly binary format.
//!
//! Each parser receives the module-in-progress, the full module byte buffer,
//! and an absolute cursor; it consumes exactly its section's payload,
//! appends into the relevant module collection, and returns the advanced
//! cursor. Offsets recorded here (function bodies, initializer expressions,
//! data payloads) always point into the module's own buffer.

use crate::instructions::skip_immediates;
use crate::module::{Module, SegmentPolicy};
use crate::prelude::*;
use wvm_format::binary;
use wvm_format::types::{FuncType, GlobalType, Limits, ValueType};

/// Declared table: funcref slots with limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDecl {
    /// Element kind (function references only)
    pub element_type: ValueType,
    /// Slot-count limits, maximum clamped to the implementation ceiling
    pub limits: Limits,
}

/// Declared linear memory: page limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDecl {
    /// Page-count limits, maximum clamped to the implementation ceiling
    pub limits: Limits,
}

/// A constant initializer expression, stored as the byte range of its
/// instructions (exclusive of the terminator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitExpr {
    /// Offset of the first instruction
    pub start: u32,
    /// Offset of the terminator opcode
    pub end: u32,
}

/// An import entry
#[derive(Debug, Clone)]
pub struct Import {
    /// Module (host) name
    pub module: String,
    /// Member name
    pub name: String,
    /// What is imported
    pub desc: ImportDesc,
}

/// Import descriptions
#[derive(Debug, Clone)]
pub enum ImportDesc {
    /// Function import with its signature index
    Function(u32),
    /// Table import
    Table(TableDecl),
    /// Memory import
    Memory(MemoryDecl),
    /// Global import
    Global(GlobalType),
}

/// A locally defined function: its signature index, expanded local-variable
/// kinds, and the byte-offset range of its instruction stream.
#[derive(Debug, Clone)]
pub struct LocalFunction {
    /// Signature index into the module's type list
    pub type_idx: u32,
    /// Per-slot local-variable kinds, expanded from the run-length encoding
    pub locals: Vec<ValueType>,
    /// Offset of the first instruction
    pub start: u32,
    /// Offset of the final terminator opcode
    pub end: u32,
    /// Branch-target offset for the function's implicit outer block
    pub br: u32,
}

/// A locally defined global with its initializer
#[derive(Debug, Clone, Copy)]
pub struct GlobalDecl {
    /// Value kind and mutability
    pub global_type: GlobalType,
    /// Constant initializer expression
    pub init: InitExpr,
}

/// Export kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Function export
    Function,
    /// Table export
    Table,
    /// Memory export
    Memory,
    /// Global export
    Global,
}

/// An export entry: a name, a kind, and the index of the entity in its kind's
/// index space (imports first).
#[derive(Debug, Clone)]
pub struct Export {
    /// Export name
    pub name: String,
    /// Export kind
    pub kind: ExportKind,
    /// Entity index
    pub index: u32,
}

/// An active element segment for table 0
#[derive(Debug, Clone)]
pub struct ElementSegment {
    /// Offset initializer expression
    pub offset: InitExpr,
    /// Function indices copied into the table
    pub func_indices: Vec<u32>,
}

/// An active data segment for memory 0
#[derive(Debug, Clone, Copy)]
pub struct DataSegment {
    /// Offset initializer expression
    pub offset: InitExpr,
    /// Offset of the raw byte span inside the module buffer
    pub payload_start: u32,
    /// Length of the raw byte span
    pub payload_len: u32,
}

/// Read a limits record: flag byte, minimum, optional maximum. The maximum is
/// clamped to `ceiling`; an absent maximum becomes the ceiling itself.
fn read_limits(bytes: &[u8], pos: usize, ceiling: u32) -> Result<(Limits, usize)> {
    let (flags, mut offset) = binary::read_leb128_u32(bytes, pos)?;
    let (min, n) = binary::read_leb128_u32(bytes, pos + offset)?;
    offset += n;

    let max = if flags & 0x1 != 0 {
        let (max, n) = binary::read_leb128_u32(bytes, pos + offset)?;
        offset += n;
        max.min(ceiling)
    } else {
        ceiling
    };

    if min > max {
        return Err(kinds::limit_exceeded(format!(
            "limits minimum {} exceeds maximum {}",
            min, max
        )));
    }

    Ok((Limits { min, max: Some(max) }, offset))
}

/// Read a table type: funcref element tag plus limits
fn read_table_type(bytes: &[u8], pos: usize) -> Result<(TableDecl, usize)> {
    let (elem_tag, mut offset) = binary::read_leb128_u7(bytes, pos)?;
    if elem_tag != binary::FUNCREF_TYPE {
        return Err(Error::new(
            ErrorCategory::Parse,
            codes::INVALID_TYPE,
            format!("table element type 0x{:02x} unsupported", elem_tag),
        ));
    }
    let (limits, n) = read_limits(bytes, pos + offset, binary::MAX_TABLE_SLOTS)?;
    offset += n;
    Ok((
        TableDecl {
            element_type: ValueType::FuncRef,
            limits,
        },
        offset,
    ))
}

/// Read a memory type: limits only
fn read_memory_type(bytes: &[u8], pos: usize) -> Result<(MemoryDecl, usize)> {
    let (limits, offset) = read_limits(bytes, pos, binary::MAX_MEMORY_PAGES)?;
    Ok((MemoryDecl { limits }, offset))
}

/// Read a constant initializer expression up to and past its terminator,
/// returning the instruction range (terminator excluded).
fn read_init_expr(bytes: &[u8], pos: usize) -> Result<(InitExpr, usize)> {
    let start = pos;
    let mut cursor = pos;
    loop {
        let (opcode, _) = binary::read_u8(bytes, cursor)?;
        if opcode == binary::END {
            let expr = InitExpr {
                start: start as u32,
                end: cursor as u32,
            };
            return Ok((expr, cursor + 1 - pos));
        }
        cursor = skip_immediates(bytes, cursor)?;
    }
}

/// Parse the type section: each entry is a function-type tag, a parameter
/// kind sequence, and a result kind sequence bounded to one result.
pub fn read_type_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    for _ in 0..count {
        let (tag, n) = binary::read_leb128_u7(bytes, pos)?;
        if tag != binary::FUNC_TYPE_TAG {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::INVALID_TYPE,
                format!("wrong function type tag 0x{:02x} at offset {}", tag, pos),
            ));
        }
        pos += n;

        let (param_count, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;
        let mut params = Vec::with_capacity(param_count as usize);
        for _ in 0..param_count {
            let (tag, n) = binary::read_leb128_u7(bytes, pos)?;
            params.push(ValueType::from_byte(tag)?);
            pos += n;
        }

        let (result_count, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;
        if result_count > 1 {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::PARSE_ERROR,
                format!(
                    "function type at offset {} declares {} results, at most 1 supported",
                    pos, result_count
                ),
            ));
        }
        let mut results = Vec::with_capacity(result_count as usize);
        for _ in 0..result_count {
            let (tag, n) = binary::read_leb128_u7(bytes, pos)?;
            results.push(ValueType::from_byte(tag)?);
            pos += n;
        }

        module.types.push(FuncType::new(params, results));
    }

    Ok(pos)
}

/// Parse the import section. Import entries are appended before any locally
/// defined entries of the same kind; indices are never renumbered afterward.
pub fn read_import_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    for _ in 0..count {
        let (import_module, n) = binary::read_string(bytes, pos)?;
        pos += n;
        let (import_name, n) = binary::read_string(bytes, pos)?;
        pos += n;

        let (kind, n) = binary::read_u8(bytes, pos)?;
        pos += n;

        let desc = match kind {
            binary::EXTERNAL_FUNCTION => {
                let (type_idx, n) = binary::read_leb128_u32(bytes, pos)?;
                pos += n;
                if type_idx as usize >= module.types.len() {
                    return Err(kinds::validation_error(
                        codes::INVALID_INDEX,
                        format!(
                            "imported function {}.{} references type {} of {}",
                            import_module,
                            import_name,
                            type_idx,
                            module.types.len()
                        ),
                    ));
                }
                module.import_func_count += 1;
                ImportDesc::Function(type_idx)
            }
            binary::EXTERNAL_TABLE => {
                let (table, n) = read_table_type(bytes, pos)?;
                pos += n;
                module.import_table_count += 1;
                ImportDesc::Table(table)
            }
            binary::EXTERNAL_MEMORY => {
                let (memory, n) = read_memory_type(bytes, pos)?;
                pos += n;
                module.import_memory_count += 1;
                ImportDesc::Memory(memory)
            }
            binary::EXTERNAL_GLOBAL => {
                let (tag, n) = binary::read_leb128_u7(bytes, pos)?;
                pos += n;
                let (mutability, n) = binary::read_leb128_u1(bytes, pos)?;
                pos += n;
                module.import_global_count += 1;
                ImportDesc::Global(GlobalType {
                    value_type: ValueType::from_byte(tag)?,
                    mutable: mutability != 0,
                })
            }
            _ => return Err(kinds::unsupported_import_kind(kind)),
        };

        module.imports.push(Import {
            module: import_module,
            name: import_name,
            desc,
        });
    }

    Ok(pos)
}

/// Parse the function section: one type index per locally defined function.
/// Bodies are filled in by the code section.
pub fn read_function_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    for _ in 0..count {
        let (type_idx, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;
        if type_idx as usize >= module.types.len() {
            return Err(kinds::validation_error(
                codes::INVALID_INDEX,
                format!(
                    "function references type {} of {}",
                    type_idx,
                    module.types.len()
                ),
            ));
        }
        module.functions.push(LocalFunction {
            type_idx,
            locals: Vec::new(),
            start: 0,
            end: 0,
            br: 0,
        });
    }

    Ok(pos)
}

/// Parse the table section: a single funcref table with limits.
pub fn read_table_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    if count != 1 {
        return Err(kinds::limit_exceeded(format!(
            "{} tables declared, at most 1 supported",
            count
        )));
    }
    if module.table.is_some() || module.import_table_count > 0 {
        return Err(kinds::limit_exceeded("more than 1 table not supported"));
    }

    let (table, n) = read_table_type(bytes, pos)?;
    pos += n;
    module.table = Some(table);

    Ok(pos)
}

/// Parse the memory section: a single linear memory with page limits.
pub fn read_memory_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    if count != 1 {
        return Err(kinds::limit_exceeded(format!(
            "{} memories declared, at most 1 supported",
            count
        )));
    }
    if module.memory.is_some() || module.import_memory_count > 0 {
        return Err(kinds::limit_exceeded("more than 1 memory not supported"));
    }

    let (memory, n) = read_memory_type(bytes, pos)?;
    pos += n;
    module.memory = Some(memory);

    Ok(pos)
}

/// Parse the global section: value kind, mutability, and the constant
/// initializer expression (evaluated during instantiation).
pub fn read_global_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    for _ in 0..count {
        let (tag, n) = binary::read_leb128_u7(bytes, pos)?;
        pos += n;
        let (mutability, n) = binary::read_leb128_u1(bytes, pos)?;
        pos += n;
        let (init, n) = read_init_expr(bytes, pos)?;
        pos += n;

        module.globals.push(GlobalDecl {
            global_type: GlobalType {
                value_type: ValueType::from_byte(tag)?,
                mutable: mutability != 0,
            },
            init,
        });
    }

    Ok(pos)
}

/// Parse the export section. Every export must reference a valid index in its
/// kind's index space (imports included).
pub fn read_export_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    for _ in 0..count {
        let (name, n) = binary::read_string(bytes, pos)?;
        pos += n;
        let (kind_tag, n) = binary::read_u8(bytes, pos)?;
        pos += n;
        let (index, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;

        let (kind, space) = match kind_tag {
            binary::EXTERNAL_FUNCTION => (ExportKind::Function, module.function_count()),
            binary::EXTERNAL_TABLE => (ExportKind::Table, module.table_count()),
            binary::EXTERNAL_MEMORY => (ExportKind::Memory, module.memory_count()),
            binary::EXTERNAL_GLOBAL => (ExportKind::Global, module.global_count()),
            _ => {
                return Err(Error::new(
                    ErrorCategory::Parse,
                    codes::PARSE_ERROR,
                    format!("invalid export kind 0x{:02x} for {}", kind_tag, name),
                ))
            }
        };

        if index >= space {
            return Err(kinds::validation_error(
                codes::INVALID_INDEX,
                format!(
                    "export {} references {:?} index {} of {}",
                    name, kind, index, space
                ),
            ));
        }

        module.exports.push(Export { name, kind, index });
    }

    Ok(pos)
}

/// Parse the start section: a single function index, which must name a
/// locally defined function.
pub fn read_start_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (func_idx, offset) = binary::read_leb128_u32(bytes, pos)?;

    if func_idx >= module.function_count() {
        return Err(kinds::validation_error(
            codes::INVALID_FUNCTION_INDEX,
            format!(
                "start function index {} of {}",
                func_idx,
                module.function_count()
            ),
        ));
    }
    if func_idx < module.import_func_count {
        return Err(kinds::validation_error(
            codes::INVALID_FUNCTION_INDEX,
            format!(
                "start function {} is an import; it must be locally defined",
                func_idx
            ),
        ));
    }
    module.start = Some(func_idx);

    Ok(pos + offset)
}

/// Parse the element section. Only active funcref segments for table 0
/// (variant 0) populate the module; passive (1) and declared (3) variants are
/// parsed and then skipped or rejected per the configured segment policy.
pub fn read_element_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    for _ in 0..count {
        let (variant, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;

        match variant {
            0 => {
                let (expr, n) = read_init_expr(bytes, pos)?;
                pos += n;
                let (func_indices, n) = read_func_index_vector(module, bytes, pos)?;
                pos += n;
                module.elements.push(ElementSegment {
                    offset: expr,
                    func_indices,
                });
            }
            1 | 3 => {
                // elem_kind tag, then the function-index vector
                let (elem_kind, n) = binary::read_u8(bytes, pos)?;
                pos += n;
                if elem_kind != 0x00 {
                    return Err(Error::new(
                        ErrorCategory::Parse,
                        codes::PARSE_ERROR,
                        format!("element kind 0x{:02x} unsupported", elem_kind),
                    ));
                }
                let (indices, n) = read_func_index_vector(module, bytes, pos)?;
                pos += n;
                match module.segment_policy {
                    SegmentPolicy::Skip => {
                        log::debug!(
                            "skipping non-active element segment variant {} ({} entries)",
                            variant,
                            indices.len()
                        );
                    }
                    SegmentPolicy::Reject => {
                        return Err(Error::new(
                            ErrorCategory::Parse,
                            codes::PARSE_ERROR,
                            format!("element segment variant {} not supported", variant),
                        ));
                    }
                }
            }
            _ => {
                return Err(Error::new(
                    ErrorCategory::Parse,
                    codes::PARSE_ERROR,
                    format!("element segment variant {} not supported", variant),
                ));
            }
        }
    }

    Ok(pos)
}

fn read_func_index_vector(
    module: &Module,
    bytes: &[u8],
    pos: usize,
) -> Result<(Vec<u32>, usize)> {
    let (count, mut offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut indices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (func_idx, n) = binary::read_leb128_u32(bytes, pos + offset)?;
        offset += n;
        if func_idx >= module.function_count() {
            return Err(kinds::validation_error(
                codes::INVALID_FUNCTION_INDEX,
                format!(
                    "element references function {} of {}",
                    func_idx,
                    module.function_count()
                ),
            ));
        }
        indices.push(func_idx);
    }
    Ok((indices, offset))
}

/// Parse the code section: per body, the byte length, the run-length-encoded
/// local declarations, and the instruction-stream offsets. The body's last
/// byte must be the block terminator.
pub fn read_code_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    if count as usize != module.functions.len() {
        return Err(Error::new(
            ErrorCategory::Parse,
            codes::PARSE_ERROR,
            format!(
                "code section declares {} bodies for {} functions",
                count,
                module.functions.len()
            ),
        ));
    }

    for c in 0..count as usize {
        let (body_size, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;
        if body_size == 0 {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::PARSE_ERROR,
                format!("function body {} is empty", c),
            ));
        }
        let payload_start = pos;
        let body_end = payload_start + body_size as usize;
        if body_end > bytes.len() {
            return Err(kinds::unexpected_eof(payload_start, "function body"));
        }

        let (local_groups, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;

        let mut locals = Vec::new();
        for _ in 0..local_groups {
            let (repeat, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
            let (tag, n) = binary::read_leb128_u7(bytes, pos)?;
            pos += n;
            let value_type = ValueType::from_byte(tag)?;
            for _ in 0..repeat {
                locals.push(value_type);
            }
        }

        if pos >= body_end {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::PARSE_ERROR,
                format!("local declarations of function body {} overrun the body", c),
            ));
        }

        let function = &mut module.functions[c];
        function.locals = locals;
        function.start = pos as u32;
        // the terminator is the body's last byte; branching out of the
        // implicit outer block lands on it
        function.end = (body_end - 1) as u32;
        function.br = function.end;

        if bytes[body_end - 1] != binary::END {
            return Err(kinds::validation_error(
                codes::UNTERMINATED_FUNCTION,
                format!("function body {} does not end with the terminator", c),
            ));
        }

        pos = body_end;
    }

    Ok(pos)
}

/// Parse the data section. Only active segments for memory 0 (variant 0)
/// populate the module; passive segments (variant 1) follow the configured
/// segment policy. The raw byte span stays in the module buffer; it is copied
/// into linear memory during instantiation.
pub fn read_data_section(module: &mut Module, bytes: &[u8], pos: usize) -> Result<usize> {
    let (count, offset) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + offset;

    for _ in 0..count {
        let (variant, n) = binary::read_leb128_u32(bytes, pos)?;
        pos += n;

        match variant {
            0 => {
                let (expr, n) = read_init_expr(bytes, pos)?;
                pos += n;
                let (size, n) = binary::read_leb128_u32(bytes, pos)?;
                pos += n;
                if pos + size as usize > bytes.len() {
                    return Err(kinds::unexpected_eof(pos, "data segment payload"));
                }
                module.data.push(DataSegment {
                    offset: expr,
                    payload_start: pos as u32,
                    payload_len: size,
                });
                pos += size as usize;
            }
            1 => {
                let (size, n) = binary::read_leb128_u32(bytes, pos)?;
                pos += n;
                if pos + size as usize > bytes.len() {
                    return Err(kinds::unexpected_eof(pos, "data segment payload"));
                }
                match module.segment_policy {
                    SegmentPolicy::Skip => {
                        log::debug!("skipping passive data segment ({} bytes)", size);
                        pos += size as usize;
                    }
                    SegmentPolicy::Reject => {
                        return Err(Error::new(
                            ErrorCategory::Parse,
                            codes::PARSE_ERROR,
                            "passive data segments not supported",
                        ));
                    }
                }
            }
            _ => {
                return Err(Error::new(
                    ErrorCategory::Parse,
                    codes::PARSE_ERROR,
                    format!("data segment variant {} not supported", variant),
                ));
            }
        }
    }

    Ok(pos)
}
