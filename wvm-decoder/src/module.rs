//! Module-level decoding: header verification and section dispatch.

use crate::control::{self, ControlMap};
use crate::prelude::*;
use crate::sections::{
    self, DataSegment, ElementSegment, Export, GlobalDecl, Import, LocalFunction, MemoryDecl,
    TableDecl,
};
use wvm_format::binary;
use wvm_format::types::FuncType;

/// What to do with recognized-but-unsupported element/data segment variants
/// (passive and declared modes).
///
/// The supported variant set is an explicit configuration rather than a
/// guess: `Reject` fails the load, `Skip` parses such segments and discards
/// them. Variants whose encoding this loader does not parse at all are
/// rejected under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentPolicy {
    /// Fail the load on passive/declared segments
    #[default]
    Reject,
    /// Parse passive/declared segments, then discard them
    Skip,
}

/// A decoded module: every section's contents in validated, in-memory form,
/// plus the resolved control-flow map.
///
/// All offsets point into the byte buffer the module was decoded from; the
/// caller must keep that buffer alive and unmodified for as long as the
/// decoded module is used.
#[derive(Debug, Default)]
pub struct Module {
    /// Function signatures, in type-section order
    pub types: Vec<FuncType>,
    /// Import entries, in import-section order
    pub imports: Vec<Import>,
    /// Number of imported functions (they precede local ones in the index
    /// space)
    pub import_func_count: u32,
    /// Number of imported tables
    pub import_table_count: u32,
    /// Number of imported memories
    pub import_memory_count: u32,
    /// Number of imported globals
    pub import_global_count: u32,
    /// Locally defined functions, in function-section order
    pub functions: Vec<LocalFunction>,
    /// Locally declared table, if any
    pub table: Option<TableDecl>,
    /// Locally declared memory, if any
    pub memory: Option<MemoryDecl>,
    /// Locally declared globals with their initializers
    pub globals: Vec<GlobalDecl>,
    /// Export entries
    pub exports: Vec<Export>,
    /// Start function index, if declared
    pub start: Option<u32>,
    /// Active element segments
    pub elements: Vec<ElementSegment>,
    /// Active data segments
    pub data: Vec<DataSegment>,
    /// Offset-keyed control-flow lookup
    pub blocks: ControlMap,
    /// Segment policy the module was decoded under
    pub segment_policy: SegmentPolicy,
}

impl Module {
    /// Total function count: imports first, then locally defined
    pub fn function_count(&self) -> u32 {
        self.import_func_count + self.functions.len() as u32
    }

    /// Total table count (imported or declared)
    pub fn table_count(&self) -> u32 {
        self.import_table_count + u32::from(self.table.is_some())
    }

    /// Total memory count (imported or declared)
    pub fn memory_count(&self) -> u32 {
        self.import_memory_count + u32::from(self.memory.is_some())
    }

    /// Total global count: imports first, then locally defined
    pub fn global_count(&self) -> u32 {
        self.import_global_count + self.globals.len() as u32
    }

    /// Decode a module from its byte buffer.
    ///
    /// Verifies the header, dispatches each section by id to its decoder
    /// (checking that every decoder consumes exactly the declared payload
    /// length), then resolves every local function's control constructs. The
    /// whole load aborts on the first error.
    pub fn decode(bytes: &[u8], segment_policy: SegmentPolicy) -> Result<Self> {
        if bytes.len() < binary::HEADER_SIZE {
            return Err(kinds::unexpected_eof(bytes.len(), "module header"));
        }
        if bytes[0..4] != binary::WASM_MAGIC {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::INVALID_MAGIC,
                format!(
                    "wrong module magic 0x{:02x}{:02x}{:02x}{:02x}",
                    bytes[3], bytes[2], bytes[1], bytes[0]
                ),
            ));
        }
        if bytes[4..8] != binary::WASM_VERSION {
            return Err(Error::new(
                ErrorCategory::Parse,
                codes::INVALID_VERSION,
                format!(
                    "wrong module version 0x{:02x}{:02x}{:02x}{:02x}",
                    bytes[7], bytes[6], bytes[5], bytes[4]
                ),
            ));
        }
        log::debug!("module header accepted, {} bytes", bytes.len());

        let mut module = Module {
            segment_policy,
            ..Module::default()
        };
        let mut pos = binary::HEADER_SIZE;

        while pos < bytes.len() {
            let (id, n) = binary::read_leb128_u7(bytes, pos)?;
            pos += n;
            let (payload_len, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
            let payload_start = pos;
            let payload_end = payload_start + payload_len as usize;
            if payload_end > bytes.len() {
                return Err(kinds::unexpected_eof(payload_start, "section payload"));
            }
            log::trace!("section id {} at offset {}, {} bytes", id, payload_start, payload_len);

            let consumed_to = match id {
                binary::CUSTOM_SECTION_ID => {
                    // custom sections carry no semantics for this loader
                    payload_end
                }
                binary::TYPE_SECTION_ID => sections::read_type_section(&mut module, bytes, pos)?,
                binary::IMPORT_SECTION_ID => {
                    sections::read_import_section(&mut module, bytes, pos)?
                }
                binary::FUNCTION_SECTION_ID => {
                    sections::read_function_section(&mut module, bytes, pos)?
                }
                binary::TABLE_SECTION_ID => sections::read_table_section(&mut module, bytes, pos)?,
                binary::MEMORY_SECTION_ID => {
                    sections::read_memory_section(&mut module, bytes, pos)?
                }
                binary::GLOBAL_SECTION_ID => {
                    sections::read_global_section(&mut module, bytes, pos)?
                }
                binary::EXPORT_SECTION_ID => {
                    sections::read_export_section(&mut module, bytes, pos)?
                }
                binary::START_SECTION_ID => sections::read_start_section(&mut module, bytes, pos)?,
                binary::ELEMENT_SECTION_ID => {
                    sections::read_element_section(&mut module, bytes, pos)?
                }
                binary::CODE_SECTION_ID => sections::read_code_section(&mut module, bytes, pos)?,
                binary::DATA_SECTION_ID => sections::read_data_section(&mut module, bytes, pos)?,
                _ => {
                    return Err(Error::new(
                        ErrorCategory::Parse,
                        codes::UNSUPPORTED_SECTION_ID,
                        format!("section id {} at offset {} not recognized", id, payload_start),
                    ));
                }
            };

            if consumed_to != payload_end {
                return Err(Error::new(
                    ErrorCategory::Parse,
                    codes::SECTION_LENGTH_MISMATCH,
                    format!(
                        "section id {} declared {} bytes but its decoder consumed {}",
                        id,
                        payload_len,
                        consumed_to - payload_start
                    ),
                ));
            }
            pos = payload_end;
        }

        module.blocks = control::resolve_functions(bytes, &module.functions)?;

        Ok(module)
    }
}
