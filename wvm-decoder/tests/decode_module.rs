//! End-to-end decoding tests over modules authored in text format.

use wvm_decoder::{BlockKind, ExportKind, ImportDesc, Module, SegmentPolicy};
use wvm_format::types::ValueType;

fn decode(wat_source: &str) -> Module {
    let bytes = wat::parse_str(wat_source).expect("wat should assemble");
    Module::decode(&bytes, SegmentPolicy::default()).expect("module should decode")
}

#[test]
fn golden_module_decodes_from_raw_bytes() {
    // type () -> i32; one function; export "answer"; body i32.const 42, end
    let bytes = hex::decode(concat!(
        "0061736d01000000",         // magic + version
        "0105016000017f",           // type section
        "03020100",                 // function section
        "070a0106616e737765720000", // export section
        "0a06010400412a0b",         // code section
    ))
    .unwrap();

    let module = Module::decode(&bytes, SegmentPolicy::default()).unwrap();
    assert_eq!(module.function_count(), 1);
    assert_eq!(module.exports.len(), 1);
    assert_eq!(module.exports[0].name, "answer");
    assert!(module.blocks.is_empty());

    let function = &module.functions[0];
    assert_eq!(bytes[function.start as usize], 0x41);
    assert_eq!(bytes[function.end as usize], 0x0B);
    assert_eq!(function.br, function.end);
}

#[test]
fn minimal_exported_function() {
    let module = decode(
        r#"(module
            (func (result i32) i32.const 42)
            (export "answer" (func 0)))"#,
    );

    assert_eq!(module.function_count(), 1);
    assert_eq!(module.exports.len(), 1);
    assert_eq!(module.exports[0].name, "answer");
    assert_eq!(module.exports[0].kind, ExportKind::Function);
    assert_eq!(module.exports[0].index, 0);

    assert_eq!(module.types.len(), 1);
    assert!(module.types[0].params.is_empty());
    assert_eq!(module.types[0].results, vec![ValueType::I32]);

    // functions do not register their implicit outer block in the lookup
    assert!(module.blocks.is_empty());
    let function = &module.functions[0];
    assert!(function.start < function.end);
    assert_eq!(function.br, function.end);
}

#[test]
fn control_constructs_are_resolved() {
    let module = decode(
        r#"(module
            (func (param i32) (result i32)
              (block (result i32)
                (loop
                  (br_if 1 (i32.const 0))
                  (br 0))
                i32.const 1)
              (if (result i32) (local.get 0)
                (then (i32.const 2))
                (else (i32.const 3)))
              i32.add))"#,
    );

    let kinds: Vec<BlockKind> = module.blocks.values().map(|b| b.kind).collect();
    assert_eq!(kinds.len(), 3);
    assert!(kinds.contains(&BlockKind::Block));
    assert!(kinds.contains(&BlockKind::Loop));
    assert!(kinds.contains(&BlockKind::If));

    for block in module.blocks.values() {
        assert!(block.start < block.end);
        match block.kind {
            BlockKind::Loop => assert_eq!(block.br, block.start + 2),
            _ => assert_eq!(block.br, block.end),
        }
        if block.kind == BlockKind::If {
            let else_offset = block.else_offset.expect("if with else arm");
            assert!(block.start < else_offset);
            assert!(else_offset < block.end);
        }
    }
}

#[test]
fn imports_precede_local_functions() {
    let module = decode(
        r#"(module
            (import "env" "log" (func (param i32)))
            (import "env" "base" (global i32))
            (func (result i32) i32.const 1))"#,
    );

    assert_eq!(module.import_func_count, 1);
    assert_eq!(module.function_count(), 2);
    assert_eq!(module.import_global_count, 1);
    assert_eq!(module.imports.len(), 2);

    match &module.imports[0].desc {
        ImportDesc::Function(type_idx) => {
            assert_eq!(module.types[*type_idx as usize].params, vec![ValueType::I32]);
        }
        other => panic!("expected function import, got {:?}", other),
    }
    assert_eq!(module.imports[1].module, "env");
    assert_eq!(module.imports[1].name, "base");
}

#[test]
fn locals_are_expanded_per_slot() {
    let module = decode(
        r#"(module
            (func (local i32 i32) (local f64) nop))"#,
    );

    assert_eq!(
        module.functions[0].locals,
        vec![ValueType::I32, ValueType::I32, ValueType::F64]
    );
}

#[test]
fn table_memory_and_segments_decode() {
    let module = decode(
        r#"(module
            (func $f (result i32) i32.const 7)
            (table 4 funcref)
            (memory 1 2)
            (global i32 (i32.const 5))
            (elem (i32.const 1) func $f)
            (data (i32.const 8) "hi"))"#,
    );

    let table = module.table.expect("table declared");
    assert_eq!(table.limits.min, 4);
    assert_eq!(table.element_type, ValueType::FuncRef);

    let memory = module.memory.expect("memory declared");
    assert_eq!(memory.limits.min, 1);
    assert_eq!(memory.limits.max, Some(2));

    assert_eq!(module.globals.len(), 1);
    assert_eq!(module.elements.len(), 1);
    assert_eq!(module.elements[0].func_indices, vec![0]);

    assert_eq!(module.data.len(), 1);
    assert_eq!(module.data[0].payload_len, 2);
}

#[test]
fn start_function_must_be_local() {
    let module = decode(
        r#"(module
            (func $init nop)
            (start $init))"#,
    );
    assert_eq!(module.start, Some(0));

    let bytes = wat::parse_str(
        r#"(module
            (import "env" "init" (func $init))
            (start $init))"#,
    )
    .unwrap();
    let err = Module::decode(&bytes, SegmentPolicy::default()).unwrap_err();
    assert!(err.is_validation_error());
}

#[test]
fn passive_segments_follow_the_policy() {
    // hand-encoded: one memory, one passive data segment ("hi")
    let mut bytes = wat::parse_str("(module (memory 1))").unwrap();
    bytes.extend_from_slice(&[0x0B, 0x05, 0x01, 0x01, 0x02, b'h', b'i']);

    let err = Module::decode(&bytes, SegmentPolicy::Reject).unwrap_err();
    assert!(err.is_parse_error());

    let module = Module::decode(&bytes, SegmentPolicy::Skip).expect("skipped under Skip policy");
    assert!(module.data.is_empty());
}
