//! Instantiation tests over modules authored in text format.

use std::sync::Arc;

use wvm_runtime::{
    Engine, Extern, FuncKind, Global, ImportResolver, LoaderConfig, Memory, Module, NoImports,
    Table, Value,
};
use wvm_error::Result;
use wvm_format::types::{Limits, ValueType};

fn load(wat_source: &str) -> Module {
    let bytes = wat::parse_str(wat_source).expect("wat should assemble");
    Module::load(bytes, &NoImports, &LoaderConfig::default()).expect("module should load")
}

struct TestHost;

impl ImportResolver for TestHost {
    fn resolve(&self, module: &str, name: &str) -> Result<Extern> {
        match (module, name) {
            ("env", "add_one") => Ok(Extern::Func(Arc::new(|args: &mut [Value]| {
                match args.first() {
                    Some(Value::I32(v)) => Ok(Some(Value::I32(v + 1))),
                    _ => Ok(None),
                }
            }))),
            ("env", "base") => Ok(Extern::Global(Value::I32(1024))),
            ("env", "memory") => Ok(Extern::Memory(
                Memory::new(Limits { min: 2, max: Some(4) }).unwrap(),
            )),
            ("env", "table") => Ok(Extern::Table(
                Table::new(ValueType::FuncRef, Limits { min: 8, max: None }).unwrap(),
            )),
            _ => Err(wvm_error::kinds::import_resolution_failed(
                module,
                name,
                "unknown member",
            )),
        }
    }
}

#[test]
fn self_contained_module_instantiates() {
    let module = load(
        r#"(module
            (memory 1)
            (global $g (mut i32) (i32.const 7))
            (func (result i32) i32.const 42)
            (export "answer" (func 0)))"#,
    );

    assert_eq!(module.functions.len(), 1);
    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.globals[0].get(), Value::I32(7));
    assert_eq!(module.exported_func("answer"), Some(0));
    assert!(module.export_by_name("missing").is_none());
    assert_eq!(module.memory.as_ref().unwrap().size_pages(), 1);
}

#[test]
fn data_segments_are_copied_into_memory() {
    let module = load(
        r#"(module
            (memory 1)
            (data (i32.const 16) "wvm"))"#,
    );

    let memory = module.memory.as_ref().unwrap();
    let mut buf = [0u8; 3];
    memory.read(16, &mut buf).unwrap();
    assert_eq!(&buf, b"wvm");
}

#[test]
fn oversized_data_segment_is_rejected_without_partial_copy() {
    // memory is one page; the segment lands past the end
    let bytes = wat::parse_str(
        r#"(module
            (memory 1)
            (data (i32.const 65534) "wvm!"))"#,
    )
    .unwrap();

    let err = Module::load(bytes, &NoImports, &LoaderConfig::default()).unwrap_err();
    assert!(err.is_resource_error());
    assert_eq!(err.code, wvm_error::codes::LIMIT_EXCEEDED);
}

#[test]
fn element_segments_populate_the_table() {
    let module = load(
        r#"(module
            (func $a (result i32) i32.const 1)
            (func $b (result i32) i32.const 2)
            (table 4 funcref)
            (elem (i32.const 1) func $a $b))"#,
    );

    let table = module.table.as_ref().unwrap();
    assert_eq!(table.get(0).unwrap(), None);
    assert_eq!(table.get(1).unwrap(), Some(0));
    assert_eq!(table.get(2).unwrap(), Some(1));
    assert_eq!(table.get(3).unwrap(), None);
}

#[test]
fn out_of_range_element_segment_is_rejected() {
    let bytes = wat::parse_str(
        r#"(module
            (func $a nop)
            (table 1 funcref)
            (elem (i32.const 1) func $a))"#,
    )
    .unwrap();

    let err = Module::load(bytes, &NoImports, &LoaderConfig::default()).unwrap_err();
    assert_eq!(err.code, wvm_error::codes::LIMIT_EXCEEDED);
}

#[test]
fn imports_bind_through_the_resolver() {
    let bytes = wat::parse_str(
        r#"(module
            (import "env" "add_one" (func $add_one (param i32) (result i32)))
            (import "env" "base" (global i32))
            (import "env" "memory" (memory 1))
            (func (result i32) i32.const 0))"#,
    )
    .unwrap();

    let module = Module::load(bytes, &TestHost, &LoaderConfig::default()).unwrap();
    assert_eq!(module.import_func_count, 1);
    assert_eq!(module.functions.len(), 2);
    assert_eq!(module.globals[0].get(), Value::I32(1024));
    assert_eq!(module.memory.as_ref().unwrap().size_pages(), 2);

    match &module.functions[0].kind {
        FuncKind::Host { module, field, func } => {
            assert_eq!(module, "env");
            assert_eq!(field, "add_one");
            let mut args = [Value::I32(41)];
            assert_eq!(func(&mut args).unwrap(), Some(Value::I32(42)));
        }
        other => panic!("expected host binding, got {:?}", other),
    }
    match &module.functions[1].kind {
        FuncKind::Local { start, end, .. } => assert!(start < end),
        other => panic!("expected local body, got {:?}", other),
    }
}

#[test]
fn unresolvable_imports_abort_the_load() {
    let bytes = wat::parse_str(
        r#"(module (import "env" "missing" (func)))"#,
    )
    .unwrap();

    let err = Module::load(bytes.clone(), &TestHost, &LoaderConfig::default()).unwrap_err();
    assert!(err.is_import_error());

    // kind mismatch: asking for "base" (a global) as a function
    let bytes = wat::parse_str(
        r#"(module (import "env" "base" (func)))"#,
    )
    .unwrap();
    let err = Module::load(bytes, &TestHost, &LoaderConfig::default()).unwrap_err();
    assert_eq!(err.code, wvm_error::codes::INCOMPATIBLE_IMPORT);
}

#[test]
fn undersized_imported_memory_is_incompatible() {
    // module requires at least 3 pages; the host provides 2
    let bytes = wat::parse_str(
        r#"(module (import "env" "memory" (memory 3)))"#,
    )
    .unwrap();

    let err = Module::load(bytes, &TestHost, &LoaderConfig::default()).unwrap_err();
    assert_eq!(err.code, wvm_error::codes::INCOMPATIBLE_IMPORT);
}

#[derive(Default)]
struct CountingEngine {
    invoked: u32,
    last_func: Option<u32>,
}

impl Engine for CountingEngine {
    fn invoke(&mut self, _module: &mut Module, func_idx: u32) -> Result<()> {
        self.invoked += 1;
        self.last_func = Some(func_idx);
        Ok(())
    }
}

#[test]
fn start_function_runs_through_the_engine() {
    let mut module = load(
        r#"(module
            (func $noop nop)
            (func $init nop)
            (start $init))"#,
    );

    let mut engine = CountingEngine::default();
    module.run_start(&mut engine).unwrap();
    assert_eq!(engine.invoked, 1);
    assert_eq!(engine.last_func, Some(1));

    // without a start section nothing is invoked
    let mut plain = load("(module (func nop))");
    let mut engine = CountingEngine::default();
    plain.run_start(&mut engine).unwrap();
    assert_eq!(engine.invoked, 0);
}

#[test]
fn globals_reference_module_order() {
    let module = load(
        r#"(module
            (global i32 (i32.const 1))
            (global i64 (i64.const -2))
            (global f64 (f64.const 0.5)))"#,
    );

    let values: Vec<Value> = module.globals.iter().map(Global::get).collect();
    assert_eq!(
        values,
        vec![Value::I32(1), Value::I64(-2), Value::F64(0.5)]
    );
}
