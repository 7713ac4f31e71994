#![cfg(test)]

use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::datatypes::{TypeId, TypeKind};
use crate::compiler_frontend::parsers::tests::test_support::{
    compile_main, compile_main_err, declared_type, ident,
};
use crate::settings::{DEFAULT_STR_LEN, OPEN_ARRAY_SIZE, SELF_PARAM_NAME};

#[test]
fn struct_fields_are_packed_in_declaration_order() {
    let program = compile_main("type Rec = struct { a: int8; b: int; c: int16 }\nfn main() {}\n");
    let rec = declared_type(&program, "Rec");

    let layout: Vec<(&str, i64)> = program
        .types
        .fields(rec)
        .iter()
        .map(|field| (program.string_table.resolve(field.name), field.offset))
        .collect();

    assert_eq!(layout, vec![("a", 0), ("b", 1), ("c", 9)]);
    assert_eq!(program.types.size_of(rec), Some(11));
}

#[test]
fn fields_sharing_a_type_get_consecutive_offsets() {
    let program = compile_main("type Point = struct {\n    x, y, z: real32\n}\nfn main() {}\n");
    let point = declared_type(&program, "Point");

    let offsets: Vec<i64> = program.types.fields(point).iter().map(|f| f.offset).collect();
    assert_eq!(offsets, vec![0, 4, 8]);
}

#[test]
fn interface_has_self_first_and_methods_know_their_offset() {
    let program = compile_main(
        "type Shape* = interface {\n    area(): real\n    scale(factor: real)\n}\nfn main() {}\n",
    );
    let shape = declared_type(&program, "Shape");
    let fields = program.types.fields(shape);

    assert_eq!(fields.len(), 3);
    assert_eq!(program.string_table.resolve(fields[0].name), SELF_PARAM_NAME);
    assert_eq!(fields[0].offset, 0);
    assert_eq!(fields[0].data_type, TypeId::PTR_VOID);

    for method in &fields[1..] {
        let signature = program
            .types
            .signature(method.data_type)
            .expect("interface methods are functions");

        assert!(signature.is_method);
        assert_eq!(signature.offset_from_self, method.offset);
        assert_eq!(program.string_table.resolve(signature.params[0].name), SELF_PARAM_NAME);
        assert_eq!(signature.params[0].data_type, TypeId::PTR_VOID);
    }

    let scale = program.types.signature(fields[2].data_type).expect("function");
    assert_eq!(fields[2].offset, 16);
    assert_eq!(scale.params.len(), 2);
    assert_eq!(scale.params[1].offset, 8);
    assert_eq!(scale.result(), Some(TypeId::VOID));
}

#[test]
fn struct_fields_cannot_be_exported() {
    let error = compile_main_err("type P = struct { x*: int }\nfn main() {}\n");
    assert_eq!(error.msg, "Field x cannot be exported");
}

#[test]
fn duplicate_struct_field() {
    let error = compile_main_err("type P = struct { x: int; x: real }\nfn main() {}\n");

    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Duplicate field x");
}

#[test]
fn duplicate_interface_method() {
    let error = compile_main_err("type I = interface { f(); f() }\nfn main() {}\n");
    assert_eq!(error.msg, "Duplicate field f");
}

#[test]
fn mutually_recursive_types_in_one_group() {
    let program = compile_main(
        "type (\n    A = struct { b: ^B }\n    B = struct { a: ^A }\n)\nfn main() {}\n",
    );

    let a = declared_type(&program, "A");
    let b_pointer = program.types.fields(a)[0].data_type;
    let b = program.types.pointer_base(b_pointer).expect("field b is a pointer");

    assert!(!program.types.is_forward(b));
    let a_pointer = program.types.fields(b)[0].data_type;
    assert_eq!(program.types.pointer_base(a_pointer), Some(a));
}

#[test]
fn self_referential_struct() {
    let program = compile_main("type Node = struct { value: int; next: ^Node }\nfn main() {}\n");

    let node = declared_type(&program, "Node");
    let next = program.types.fields(node)[1].data_type;
    let base = program.types.pointer_base(next).expect("pointer");

    assert!(program.types.equivalent(base, node));
}

#[test]
fn consecutive_type_declarations_resolve_together() {
    let program = compile_main("type A = ^B; type B = struct { x: A }\nfn main() {}\n");

    let a = declared_type(&program, "A");
    let b = declared_type(&program, "B");
    assert_eq!(program.types.pointer_base(a), Some(b));
    assert_eq!(program.types.fields(b)[0].data_type, a);
}

#[test]
fn forward_type_left_unresolved_after_its_group() {
    let error = compile_main_err(
        "type A = struct { b: ^B }\nvar gap: int\ntype B = struct { x: int }\nfn main() {}\n",
    );

    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Unresolved forward type declaration B");
}

#[test]
fn array_lengths_are_constant_expressions() {
    let program = compile_main("const n = 4\ntype Buf = [n * 2]int32\ntype Any = []int\nfn main() {}\n");

    let buf = declared_type(&program, "Buf");
    assert_eq!(
        program.types.get(buf),
        &TypeKind::Array {
            base: TypeId::INT32,
            length: 8
        }
    );
    assert_eq!(program.types.size_of(buf), Some(32));

    let any = declared_type(&program, "Any");
    assert_eq!(program.types.size_of(any), Some(OPEN_ARRAY_SIZE));
}

#[test]
fn negative_array_length() {
    let error = compile_main_err("type Buf = [-1]int\nfn main() {}\n");
    assert_eq!(error.msg, "Array length cannot be negative");
}

#[test]
fn array_length_must_be_an_integer() {
    let error = compile_main_err("type Buf = [1.5]int\nfn main() {}\n");

    assert_eq!(error.error_type, ErrorType::Type);
    assert_eq!(error.msg, "Incompatible types int and real");
}

#[test]
fn string_capacity() {
    let program = compile_main("type Name = str\ntype Code = str[16]\nfn main() {}\n");

    assert_eq!(
        program.types.get(declared_type(&program, "Name")),
        &TypeKind::BoundedString {
            capacity: DEFAULT_STR_LEN + 1
        }
    );
    assert_eq!(
        program.types.get(declared_type(&program, "Code")),
        &TypeKind::BoundedString { capacity: 16 }
    );
}

#[test]
fn negative_string_length() {
    let error = compile_main_err("type Code = str[-2]\nfn main() {}\n");
    assert_eq!(error.msg, "String length cannot be negative");
}

#[test]
fn function_type() {
    let program = compile_main("type Handler* = fn (code: int): bool\nfn main() {}\n");

    let handler = ident(&program, "main", "Handler");
    assert!(handler.exported);

    let signature = program.types.signature(handler.data_type).expect("function type");
    assert_eq!(signature.params.len(), 1);
    assert_eq!(signature.result(), Some(TypeId::BOOL));
    assert!(!signature.is_method);
}

#[test]
fn constant_used_as_a_type() {
    let error = compile_main_err("const k = 1\ntype T = k\nfn main() {}\n");
    assert_eq!(error.msg, "Type expected but constant k found");
}

#[test]
fn unknown_type_name() {
    let error = compile_main_err("var x: Missing\nfn main() {}\n");
    assert_eq!(error.msg, "Unknown identifier Missing");
}

#[test]
fn forward_type_cannot_be_embedded_by_value() {
    let error = compile_main_err(
        "type P = ^B\ntype C = struct { b: B; n: int }\ntype B = struct { x: int }\nfn main() {}\n",
    );

    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Unresolved forward type B can only be used through a pointer");
    assert_eq!(error.location.start_pos.line_number, 1);
}

#[test]
fn value_cycle_through_a_forward_type_is_rejected() {
    let error = compile_main_err(
        "type P = ^B\ntype C = struct { b: B }\ntype B = struct { c: C }\nfn main() {\n    var x: B\n}\n",
    );

    assert_eq!(error.msg, "Unresolved forward type B can only be used through a pointer");
}

#[test]
fn forward_type_can_be_pointed_to_more_than_once() {
    let program = compile_main(
        "type P = ^B\ntype Q = ^B\ntype B = struct { x: int }\ntype C = struct { b: B; n: int }\nfn main() {}\n",
    );

    let b = declared_type(&program, "B");
    assert_eq!(program.types.pointer_base(declared_type(&program, "P")), Some(b));
    assert_eq!(program.types.pointer_base(declared_type(&program, "Q")), Some(b));

    // Once declared, the type is embedded with its real size
    let c = declared_type(&program, "C");
    let offsets: Vec<i64> = program.types.fields(c).iter().map(|f| f.offset).collect();
    assert_eq!(offsets, vec![0, 8]);
    assert_eq!(program.types.size_of(c), Some(16));
}

#[test]
fn array_too_large_to_lay_out() {
    let error = compile_main_err(
        "type S = struct { a: [4611686018427387904]int; b: int }\nfn main() {}\n",
    );

    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Type is too large");
}

#[test]
fn struct_too_large_to_lay_out() {
    let error = compile_main_err(
        "type Half = [4611686018427387904]int8\ntype S = struct { a, b: Half }\nfn main() {}\n",
    );

    assert_eq!(error.msg, "Type is too large");
    assert_eq!(error.location.start_pos.line_number, 1);
}

#[test]
fn locals_too_large_for_the_frame() {
    let error = compile_main_err(
        "type Half = [4611686018427387904]int8\nfn main() {\n    var a: Half\n    var b: Half\n}\n",
    );

    assert_eq!(error.msg, "Local variable b is too large");
}
