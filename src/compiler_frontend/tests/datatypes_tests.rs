use super::*;
use crate::compiler_frontend::string_interning::StringTable;

fn struct_with(types: &mut TypeTable, names: &mut StringTable, fields: &[(&str, TypeId)]) -> TypeId {
    let id = types.add(TypeKind::Struct { fields: Vec::new() });
    for (name, data_type) in fields {
        let name = names.intern(name);
        types.add_field(id, name, *data_type).expect("field fits");
    }
    id
}

#[test]
fn builtin_sizes() {
    let types = TypeTable::new();

    assert_eq!(types.size_of(TypeId::VOID), Some(0));
    assert_eq!(types.size_of(TypeId::INT8), Some(1));
    assert_eq!(types.size_of(TypeId::UINT16), Some(2));
    assert_eq!(types.size_of(TypeId::REAL32), Some(4));
    assert_eq!(types.size_of(TypeId::INT), Some(8));
    assert_eq!(types.size_of(TypeId::PTR_VOID), Some(POINTER_SIZE));
}

#[test]
fn field_offsets_accumulate_in_declaration_order() {
    let mut types = TypeTable::new();
    let mut names = StringTable::new();

    let record = struct_with(
        &mut types,
        &mut names,
        &[("a", TypeId::INT8), ("b", TypeId::INT), ("c", TypeId::INT16)],
    );

    let offsets: Vec<i64> = types.fields(record).iter().map(|field| field.offset).collect();
    assert_eq!(offsets, vec![0, 1, 9]);
    assert_eq!(types.size_of(record), Some(11));
}

#[test]
fn array_sizes() {
    let mut types = TypeTable::new();

    let fixed = types.add(TypeKind::Array {
        base: TypeId::INT32,
        length: 10,
    });
    let open = types.add(TypeKind::Array {
        base: TypeId::INT32,
        length: -1,
    });

    assert_eq!(types.size_of(fixed), Some(40));
    assert_eq!(types.size_of(open), Some(OPEN_ARRAY_SIZE));
    assert!(types.is_structured(fixed));
    assert!(!types.is_structured(TypeId::PTR_VOID));
}

#[test]
fn params_are_laid_out_like_fields() {
    let types = TypeTable::new();
    let mut names = StringTable::new();
    let mut signature = Signature::default();

    for (name, data_type) in [("x", TypeId::INT16), ("y", TypeId::REAL), ("z", TypeId::BOOL)] {
        types
            .add_param(&mut signature, names.intern(name), data_type, None)
            .expect("param fits");
    }

    let offsets: Vec<i64> = signature.params.iter().map(|param| param.offset).collect();
    assert_eq!(offsets, vec![0, 2, 10]);
    assert_eq!(signature.params_size, 11);
}

#[test]
fn patching_a_forward_is_seen_through_existing_pointers() {
    let mut types = TypeTable::new();
    let mut names = StringTable::new();

    let forward = types.add(TypeKind::Forward {
        ident: IdentId::PENDING,
    });
    let pointer = types.add_pointer_to(forward);
    assert!(types.first_unresolved_forward().is_some());

    let concrete = struct_with(&mut types, &mut names, &[("next", pointer)]);
    types.patch_forward(forward, concrete);

    assert_eq!(types.first_unresolved_forward(), None);
    assert!(!types.is_forward(forward));

    let base = types.pointer_base(pointer).expect("pointer type");
    assert_eq!(types.size_of(base), Some(POINTER_SIZE));
    assert_eq!(types.fields(base).len(), 1);
}

#[test]
fn recursive_structs_compare_structurally() {
    let mut types = TypeTable::new();
    let mut names = StringTable::new();

    let mut build_list = |types: &mut TypeTable| {
        let forward = types.add(TypeKind::Forward {
            ident: IdentId::PENDING,
        });
        let next = types.add_pointer_to(forward);
        let node = struct_with(types, &mut names, &[("value", TypeId::INT), ("next", next)]);
        types.patch_forward(forward, node);
        node
    };

    let first = build_list(&mut types);
    let second = build_list(&mut types);

    assert_ne!(first, second);
    assert!(types.equivalent(first, second));
}

#[test]
fn structs_with_different_field_names_are_not_equivalent() {
    let mut types = TypeTable::new();
    let mut names = StringTable::new();

    let a = struct_with(&mut types, &mut names, &[("x", TypeId::INT)]);
    let b = struct_with(&mut types, &mut names, &[("y", TypeId::INT)]);

    assert!(!types.equivalent(a, b));
    assert!(!types.compatible(a, b));
}

#[test]
fn compatibility_rules() {
    let mut types = TypeTable::new();
    let int_pointer = types.add_pointer_to(TypeId::INT);
    let real_pointer = types.add_pointer_to(TypeId::REAL);
    let short = types.add(TypeKind::BoundedString { capacity: 8 });
    let long = types.add(TypeKind::BoundedString { capacity: 256 });

    assert!(types.compatible(TypeId::INT8, TypeId::INT));
    assert!(types.compatible(TypeId::REAL32, TypeId::REAL));
    assert!(!types.compatible(TypeId::INT, TypeId::REAL));
    assert!(!types.compatible(TypeId::BOOL, TypeId::INT));

    assert!(types.compatible(int_pointer, TypeId::NULL));
    assert!(types.compatible(int_pointer, TypeId::PTR_VOID));
    assert!(types.compatible(TypeId::PTR_VOID, real_pointer));
    assert!(!types.compatible(int_pointer, real_pointer));

    assert!(types.compatible(short, long));
}

#[test]
fn display_spells_types_for_diagnostics() {
    let mut types = TypeTable::new();
    let mut names = StringTable::new();

    let array = types.add(TypeKind::Array {
        base: TypeId::CHAR,
        length: 4,
    });
    let pointer = types.add_pointer_to(array);
    let record = struct_with(&mut types, &mut names, &[("a", TypeId::INT), ("b", pointer)]);

    assert_eq!(types.display(pointer, &names), "^[4]char");
    assert_eq!(types.display(record, &names), "struct {a, b}");
}

#[test]
fn oversized_layouts_are_reported_instead_of_overflowing() {
    let mut types = TypeTable::new();
    let mut names = StringTable::new();

    let huge = types.add(TypeKind::Array {
        base: TypeId::INT,
        length: i64::MAX / 4,
    });
    assert_eq!(types.size_of(huge), None);

    let half = types.add(TypeKind::Array {
        base: TypeId::INT8,
        length: i64::MAX / 2 + 1,
    });
    let record = struct_with(&mut types, &mut names, &[("a", half)]);
    assert_eq!(types.add_field(record, names.intern("b"), half), None);
    assert_eq!(types.fields(record).len(), 1);

    let mut signature = Signature::default();
    types
        .add_param(&mut signature, names.intern("a"), half, None)
        .expect("one half fits");
    assert_eq!(types.add_param(&mut signature, names.intern("b"), half, None), None);
    assert_eq!(signature.params.len(), 1);
}
