#![cfg(test)]

use crate::compiler_frontend::codegen::instructions::Instruction;
use crate::compiler_frontend::compiler_errors::ErrorType;
use crate::compiler_frontend::datatypes::TypeId;
use crate::compiler_frontend::optimizers::constant_folding::ConstValue;
use crate::compiler_frontend::parsers::tests::test_support::{
    compile_main, compile_main_err, declared_type, ident, main_body,
};
use crate::compiler_frontend::symbols::identifiers::{IdentKind, IdentPayload};
use crate::settings::MAX_IDENTS;

#[test]
fn global_initializer_is_folded_without_code() {
    let program = compile_main("var x: int = 2 * 3 + 1\nfn main() {}\n");

    assert_eq!(program.globals.len(), 1);
    assert_eq!(program.globals[0].value, Some(ConstValue::Int(7)));

    // Entry stub plus the return of main
    assert_eq!(
        program.code,
        vec![Instruction::Goto(1), Instruction::Return { params_size: 0 }]
    );
}

#[test]
fn local_initializer_assigns_at_run_time() {
    let program = compile_main("fn main() {\n    var x: int = 5\n}\n");

    assert_eq!(
        main_body(&program),
        &[
            Instruction::PushLocalPtr(0),
            Instruction::PushConst(ConstValue::Int(5)),
            Instruction::Assign(TypeId::INT),
            Instruction::Return { params_size: 0 },
        ]
    );
}

#[test]
fn local_short_var_evaluates_before_the_variable() {
    let program = compile_main("fn main() {\n    x := 7\n}\n");

    assert_eq!(
        main_body(&program),
        &[
            Instruction::PushConst(ConstValue::Int(7)),
            Instruction::PushLocalPtr(0),
            Instruction::SwapAssign(TypeId::INT),
            Instruction::Return { params_size: 0 },
        ]
    );
}

#[test]
fn locals_are_laid_out_in_declaration_order() {
    let program = compile_main(
        "fn main() {\n    var a: int8\n    var b: int\n    b = 3\n}\n",
    );

    assert_eq!(
        main_body(&program),
        &[
            Instruction::PushLocalPtr(1),
            Instruction::PushConst(ConstValue::Int(3)),
            Instruction::Assign(TypeId::INT),
            Instruction::Return { params_size: 0 },
        ]
    );
}

#[test]
fn global_short_var_takes_the_initializer_type() {
    let program = compile_main("ratio := 1.5 * 2.0\nfn main() {}\n");

    assert_eq!(declared_type(&program, "ratio"), TypeId::REAL);
    assert_eq!(program.globals[0].value, Some(ConstValue::Real(3.0)));
}

#[test]
fn integer_initializer_converts_to_real() {
    let program = compile_main("var r: real = 2\nfn main() {}\n");

    assert_eq!(program.globals[0].value, Some(ConstValue::Real(2.0)));
}

#[test]
fn const_group_folds_and_exports() {
    let program = compile_main("const (\n    base = 2\n    scaled* = base * 10\n)\nfn main() {}\n");

    let scaled = ident(&program, "main", "scaled");
    assert_eq!(scaled.kind, IdentKind::Const);
    assert!(scaled.exported);
    assert_eq!(scaled.payload, IdentPayload::Const(ConstValue::Int(20)));
    assert!(!ident(&program, "main", "base").exported);
}

#[test]
fn duplicate_identifier_in_one_scope() {
    let error = compile_main_err("var x: int\nvar x: real\nfn main() {}\n");

    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Duplicate identifier x");
}

#[test]
fn shadowing_in_a_nested_block_is_allowed() {
    let program = compile_main("var x: int\nfn main() {\n    var x: real\n    {\n        x := 1\n    }\n}\n");

    assert_eq!(declared_type(&program, "x"), TypeId::INT);
}

#[test]
fn only_one_variable_can_be_initialized() {
    let error = compile_main_err("var a, b: int = 1\nfn main() {}\n");
    assert_eq!(error.msg, "Unable to initialize multiple variables");
}

#[test]
fn nested_functions_are_rejected() {
    let error = compile_main_err("fn main() {\n    fn inner() {}\n}\n");
    assert_eq!(error.msg, "Nested functions are not allowed");
}

#[test]
fn local_identifiers_cannot_be_exported() {
    let error = compile_main_err("fn main() {\n    var x*: int\n}\n");
    assert_eq!(error.msg, "Local identifier x cannot be exported");
}

#[test]
fn method_name_collides_with_struct_field() {
    let error = compile_main_err(
        "type Point = struct { x, y: int }\nfn (p: ^Point) x(): int { return 1 }\nfn main() {}\n",
    );

    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Structure already has field x");
}

#[test]
fn method_name_collides_with_interface_method() {
    let error = compile_main_err(
        "type Shape = interface { area(): real }\nfn (s: ^Shape) area(): real { return 0.0 }\nfn main() {}\n",
    );

    assert_eq!(error.msg, "Interface already has field area");
}

#[test]
fn method_declared_twice_on_one_type() {
    let error = compile_main_err(
        "type Point = struct { x, y: int }\nfn (p: ^Point) norm(): int { return 0 }\nfn (q: ^Point) norm(): int { return 1 }\nfn main() {}\n",
    );

    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Duplicate method norm");
    assert_eq!(error.location.start_pos.line_number, 2);
}

#[test]
fn methods_live_next_to_plain_functions_of_the_same_name() {
    let program = compile_main(
        "type Point = struct { x, y: int }\nfn (p: ^Point) length(): int { return 0 }\nfn length(): int { return 1 }\nfn main() {}\n",
    );

    let methods: Vec<_> = program
        .idents
        .iter()
        .filter(|(_, ident)| program.string_table.resolve(ident.name) == "length")
        .map(|(_, ident)| ident.receiver.is_some())
        .collect();

    assert_eq!(methods, vec![true, false]);
}

#[test]
fn global_initializer_must_be_constant() {
    let error = compile_main_err("var x: int = 1\nvar y: int = x\nfn main() {}\n");
    assert_eq!(error.msg, "Constant expected but variable x found");
}

#[test]
fn incompatible_initializer() {
    let error = compile_main_err("var flag: bool = 1\nfn main() {}\n");

    assert_eq!(error.error_type, ErrorType::Type);
    assert_eq!(error.msg, "Incompatible types bool and int");
}

#[test]
fn null_initializer_has_no_type_to_infer() {
    let error = compile_main_err("p := null\nfn main() {}\n");
    assert_eq!(error.msg, "Type of p cannot be inferred from null");
}

#[test]
fn assigning_to_a_constant_is_rejected() {
    let error = compile_main_err("const limit = 3\nfn main() {\n    limit = 4\n}\n");
    assert_eq!(error.msg, "Variable expected but constant limit found");
}

#[test]
fn declaration_expected_at_module_scope() {
    let error = compile_main_err("return\n");

    assert_eq!(error.error_type, ErrorType::Syntax);
    assert_eq!(error.msg, "Declaration expected but return found");
}

fn var_list(count: usize) -> String {
    let names: Vec<String> = (0..count).map(|index| format!("v{index}")).collect();
    format!("var {}: int\nfn main() {{}}\n", names.join(", "))
}

#[test]
fn variable_list_is_limited_to_max_idents() {
    let program = compile_main(&var_list(MAX_IDENTS));
    assert_eq!(program.globals.len(), MAX_IDENTS);

    let error = compile_main_err(&var_list(MAX_IDENTS + 1));
    assert_eq!(error.error_type, ErrorType::Rule);
    assert_eq!(error.msg, "Too many identifiers");
}
