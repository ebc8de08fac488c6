//! Module instantiation.
//!
//! Drives the full load: decode the binary, bind imports through the
//! injected resolver, allocate table/memory/global storage, evaluate
//! constant initializer expressions through the module's own operand stack,
//! apply element and data segments with full bounds checks, and hand the
//! finished instance to the execution engine.

use crate::config::LoaderConfig;
use crate::global::Global;
use crate::host::{Extern, HostFunc, ImportResolver};
use crate::memory::Memory;
use crate::prelude::*;
use crate::stack::RuntimeState;
use crate::table::Table;
use crate::values::Value;
use wvm_decoder::{ControlMap, Export, ExportKind, ImportDesc, InitExpr};
use wvm_format::binary;
use wvm_format::types::{FuncType, ValueType};

/// The execution engine collaborator.
///
/// The loader calls `invoke` once, synchronously, for a declared start
/// function; embedders call it for exported functions. Failures carry their
/// diagnostic in the returned error.
pub trait Engine {
    /// Execute function `func_idx` of `module` to completion.
    fn invoke(&mut self, module: &mut Module, func_idx: u32) -> Result<()>;
}

/// How a function is realized: a host binding or a local body.
///
/// The two are mutually exclusive by construction.
#[derive(Clone)]
pub enum FuncKind {
    /// Imported: bound to a host-provided callable
    Host {
        /// Host/module name the function was imported from
        module: String,
        /// Member name
        field: String,
        /// The host callable
        func: HostFunc,
    },
    /// Locally defined: a body inside the module buffer
    Local {
        /// Per-slot local-variable kinds
        locals: Vec<ValueType>,
        /// Offset of the first instruction
        start: u32,
        /// Offset of the terminator
        end: u32,
        /// Branch target of the implicit outer block
        br: u32,
    },
}

impl core::fmt::Debug for FuncKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FuncKind::Host { module, field, .. } => f
                .debug_struct("Host")
                .field("module", module)
                .field("field", field)
                .finish_non_exhaustive(),
            FuncKind::Local {
                locals,
                start,
                end,
                br,
            } => f
                .debug_struct("Local")
                .field("locals", locals)
                .field("start", start)
                .field("end", end)
                .field("br", br)
                .finish(),
        }
    }
}

/// One function in the module's index space.
#[derive(Debug, Clone)]
pub struct Function {
    /// Signature index into [`Module::types`]
    pub type_idx: u32,
    /// Host binding or local body
    pub kind: FuncKind,
}

/// A fully instantiated module, ready for the execution engine.
///
/// Owns its byte buffer (never mutated after decoding), every decoded
/// collection, the storage behind its table/memory/globals, and its own
/// runtime state. Nothing is shared between instances.
#[derive(Debug)]
pub struct Module {
    bytes: Vec<u8>,
    /// Function signatures
    pub types: Vec<FuncType>,
    /// Functions: imports first, then locally defined, indices stable
    pub functions: Vec<Function>,
    /// Number of imported functions
    pub import_func_count: u32,
    /// Offset-keyed control-flow lookup for every `block`/`loop`/`if`
    pub blocks: ControlMap,
    /// The table, if imported or declared
    pub table: Option<Table>,
    /// The linear memory, if imported or declared
    pub memory: Option<Memory>,
    /// Globals: imports first, then locally defined
    pub globals: Vec<Global>,
    /// Export entries
    pub exports: Vec<Export>,
    /// Start function index, if declared
    pub start: Option<u32>,
    /// Operand stack, call stack, and branch scratch
    pub state: RuntimeState,
}

impl Module {
    /// Load a module: decode, bind imports, allocate storage, initialize.
    ///
    /// The buffer is owned by the returned module and never mutated; every
    /// offset in the control-flow map and function records points into it.
    pub fn load(
        bytes: Vec<u8>,
        resolver: &dyn ImportResolver,
        config: &LoaderConfig,
    ) -> Result<Self> {
        let decoded = wvm_decoder::Module::decode(&bytes, config.segment_policy)?;
        let mut state = RuntimeState::new(config)?;

        let mut functions = Vec::with_capacity(decoded.function_count() as usize);
        let mut table: Option<Table> = None;
        let mut memory: Option<Memory> = None;
        let mut globals = Vec::with_capacity(decoded.global_count() as usize);

        // Imports come first in every index space and are never renumbered.
        for import in &decoded.imports {
            let provided = resolver.resolve(&import.module, &import.name)?;
            match (&import.desc, provided) {
                (ImportDesc::Function(type_idx), Extern::Func(func)) => {
                    functions.push(Function {
                        type_idx: *type_idx,
                        kind: FuncKind::Host {
                            module: import.module.clone(),
                            field: import.name.clone(),
                            func,
                        },
                    });
                }
                (ImportDesc::Table(decl), Extern::Table(provided)) => {
                    if provided.element_type != decl.element_type
                        || provided.size() < decl.limits.min
                    {
                        return Err(incompatible_import(import, "table too small"));
                    }
                    table = Some(provided);
                }
                (ImportDesc::Memory(decl), Extern::Memory(provided)) => {
                    if provided.size_pages() < decl.limits.min {
                        return Err(incompatible_import(import, "memory too small"));
                    }
                    memory = Some(provided);
                }
                (ImportDesc::Global(global_type), Extern::Global(value)) => {
                    globals.push(Global::new(*global_type, value)?);
                }
                (_, provided) => {
                    return Err(incompatible_import(
                        import,
                        &format!("host provided {:?} for a different kind", provided),
                    ));
                }
            }
        }

        for function in &decoded.functions {
            functions.push(Function {
                type_idx: function.type_idx,
                kind: FuncKind::Local {
                    locals: function.locals.clone(),
                    start: function.start,
                    end: function.end,
                    br: function.br,
                },
            });
        }

        if let Some(decl) = decoded.table {
            table = Some(Table::new(decl.element_type, decl.limits)?);
        }
        if let Some(decl) = decoded.memory {
            memory = Some(Memory::new(decl.limits)?);
        }

        // Locally declared globals are initialized by evaluating their
        // constant expressions through this module's own operand stack.
        for decl in &decoded.globals {
            let value = eval_init_expr(
                &bytes,
                decl.init,
                &mut state,
                decl.global_type.value_type,
            )?;
            globals.push(Global::new(decl.global_type, value)?);
        }

        // Element segments: resolve the offset, then copy function indices
        // into the table. The whole range is checked before any slot is
        // written.
        for segment in &decoded.elements {
            let offset = eval_offset_expr(&bytes, segment.offset, &mut state)?;
            let table = table.as_mut().ok_or_else(|| {
                kinds::limit_exceeded("element segment applied to a module without a table")
            })?;
            let end = u64::from(offset) + segment.func_indices.len() as u64;
            if end > u64::from(table.size()) {
                return Err(kinds::limit_exceeded(format!(
                    "element segment [{}, {}) exceeds table size {}",
                    offset,
                    end,
                    table.size()
                )));
            }
            for (i, func_idx) in segment.func_indices.iter().enumerate() {
                table.set(offset + i as u32, Some(*func_idx))?;
            }
        }

        // Data segments: resolve the offset, then copy the raw span into
        // linear memory. No partial copy on failure.
        for segment in &decoded.data {
            let offset = eval_offset_expr(&bytes, segment.offset, &mut state)?;
            let memory = memory.as_mut().ok_or_else(|| {
                kinds::limit_exceeded("data segment applied to a module without a memory")
            })?;
            let end = u64::from(offset) + u64::from(segment.payload_len);
            if end > memory.size_bytes() as u64 {
                return Err(kinds::limit_exceeded(format!(
                    "data segment [{}, {}) exceeds memory size {}",
                    offset,
                    end,
                    memory.size_bytes()
                )));
            }
            let payload_start = segment.payload_start as usize;
            let payload = &bytes[payload_start..payload_start + segment.payload_len as usize];
            memory.write(offset as usize, payload)?;
        }

        log::debug!(
            "instantiated module: {} functions ({} imported), {} globals, {} exports",
            functions.len(),
            decoded.import_func_count,
            globals.len(),
            decoded.exports.len()
        );

        Ok(Module {
            bytes,
            types: decoded.types,
            functions,
            import_func_count: decoded.import_func_count,
            blocks: decoded.blocks,
            table,
            memory,
            globals,
            exports: decoded.exports,
            start: decoded.start,
            state,
        })
    }

    /// The module's raw byte buffer (read-only for the module's lifetime)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The signature of function `func_idx`
    pub fn func_type(&self, func_idx: u32) -> Option<&FuncType> {
        let function = self.functions.get(func_idx as usize)?;
        self.types.get(function.type_idx as usize)
    }

    /// Find an export by name
    pub fn export_by_name(&self, name: &str) -> Option<&Export> {
        self.exports.iter().find(|export| export.name == name)
    }

    /// Find an exported function's index by name
    pub fn exported_func(&self, name: &str) -> Option<u32> {
        self.export_by_name(name)
            .filter(|export| export.kind == ExportKind::Function)
            .map(|export| export.index)
    }

    /// Invoke the start function, if the module declares one.
    ///
    /// Called once after instantiation, before any exported function.
    pub fn run_start(&mut self, engine: &mut dyn Engine) -> Result<()> {
        if let Some(func_idx) = self.start {
            log::debug!("invoking start function {}", func_idx);
            engine.invoke(self, func_idx)?;
        }
        Ok(())
    }
}

fn incompatible_import(import: &wvm_decoder::Import, reason: &str) -> Error {
    Error::new(
        ErrorCategory::Import,
        codes::INCOMPATIBLE_IMPORT,
        format!(
            "import {}.{} incompatible: {}",
            import.module, import.name, reason
        ),
    )
}

/// Evaluate a constant initializer expression through the operand stack.
///
/// The accepted subset is constant pushes and nothing else; the popped
/// result must match the expected kind.
fn eval_init_expr(
    bytes: &[u8],
    expr: InitExpr,
    state: &mut RuntimeState,
    expected: ValueType,
) -> Result<Value> {
    let mut pos = expr.start as usize;
    let end = expr.end as usize;

    while pos < end {
        let (opcode, _) = binary::read_u8(bytes, pos)?;
        pos += 1;
        match opcode {
            binary::I32_CONST => {
                let (value, n) = binary::read_leb128_i32(bytes, pos)?;
                pos += n;
                state.push_value(Value::I32(value))?;
            }
            binary::I64_CONST => {
                let (value, n) = binary::read_leb128_i64(bytes, pos)?;
                pos += n;
                state.push_value(Value::I64(value))?;
            }
            binary::F32_CONST => {
                let (value, n) = binary::read_f32(bytes, pos)?;
                pos += n;
                state.push_value(Value::F32(value))?;
            }
            binary::F64_CONST => {
                let (value, n) = binary::read_f64(bytes, pos)?;
                pos += n;
                state.push_value(Value::F64(value))?;
            }
            _ => {
                return Err(Error::new(
                    ErrorCategory::Parse,
                    codes::PARSE_ERROR,
                    format!(
                        "instruction 0x{:02x} at offset {} not allowed in a constant expression",
                        opcode,
                        pos - 1
                    ),
                ));
            }
        }
    }

    let value = state.pop_value()?;
    if value.value_type() != expected {
        return Err(Error::new(
            ErrorCategory::Validation,
            codes::TYPE_MISMATCH,
            format!(
                "constant expression produced {} where {} was expected",
                value.value_type(),
                expected
            ),
        ));
    }
    Ok(value)
}

/// Evaluate a segment offset expression, which must produce an i32.
fn eval_offset_expr(bytes: &[u8], expr: InitExpr, state: &mut RuntimeState) -> Result<u32> {
    let value = eval_init_expr(bytes, expr, state, ValueType::I32)?;
    match value {
        Value::I32(offset) => Ok(offset as u32),
        other => Err(Error::new(
            ErrorCategory::Validation,
            codes::TYPE_MISMATCH,
            format!("segment offset produced {} instead of an i32", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wvm_format::binary::END;

    fn state() -> RuntimeState {
        RuntimeState::new(&LoaderConfig::default()).unwrap()
    }

    fn expr_over(body: &[u8]) -> InitExpr {
        // body includes the terminator as its last byte
        InitExpr {
            start: 0,
            end: (body.len() - 1) as u32,
        }
    }

    #[test]
    fn const_expr_evaluates_through_the_stack() {
        let body = [binary::I32_CONST, 0x2A, END];
        let mut state = state();
        let value =
            eval_init_expr(&body, expr_over(&body), &mut state, ValueType::I32).unwrap();
        assert_eq!(value, Value::I32(42));
        // the stack is back to empty
        assert_eq!(state.sp, -1);
    }

    #[test]
    fn const_expr_kind_is_checked() {
        let body = [binary::I64_CONST, 0x01, END];
        let mut state = state();
        let err =
            eval_init_expr(&body, expr_over(&body), &mut state, ValueType::I32).unwrap_err();
        assert_eq!(err.code, codes::TYPE_MISMATCH);
    }

    #[test]
    fn non_constant_instructions_are_rejected() {
        // global.get 0 is outside the accepted subset
        let body = [binary::GLOBAL_GET, 0x00, END];
        let mut state = state();
        let err =
            eval_init_expr(&body, expr_over(&body), &mut state, ValueType::I32).unwrap_err();
        assert_eq!(err.code, codes::PARSE_ERROR);
    }

    #[test]
    fn empty_const_expr_underflows() {
        let body = [END];
        let mut state = state();
        let err =
            eval_init_expr(&body, expr_over(&body), &mut state, ValueType::I32).unwrap_err();
        assert_eq!(err.code, codes::STACK_UNDERFLOW);
    }
}
