use crate::compiler_frontend::optimizers::constant_folding::ConstValue;
use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::symbols::identifiers::IdentId;
use crate::settings::{OPEN_ARRAY_SIZE, POINTER_SIZE};
use crate::type_log;
use rustc_hash::FxHashSet;

/// Index into the type arena.
/// Types are never copied around, everything holds one of these instead.
/// That is what makes patching a forward declaration visible everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    Void,
    Null,

    // Ordinals
    Int8,
    Int16,
    Int32,
    Int,
    Uint8,
    Uint16,
    Uint32,
    Uint,
    Bool,
    Char,

    Real32,
    Real,

    Pointer { base: TypeId },

    /// A length of -1 is an open array
    Array { base: TypeId, length: i64 },

    BoundedString { capacity: i64 },
    Struct { fields: Vec<Field> },

    /// Field 0 is always the hidden self pointer
    Interface { fields: Vec<Field> },

    Function { signature: Signature },

    /// Placeholder bound to a name before its declaration has been parsed
    Forward { ident: IdentId },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: StringId,
    pub data_type: TypeId,
    pub offset: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: StringId,
    pub data_type: TypeId,
    pub offset: i64,
    pub default_value: Option<ConstValue>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Param>,

    /// Length of the trailing run of parameters that have default values
    pub num_default_params: usize,
    pub is_method: bool,

    /// For interface methods, the offset of the method field inside the interface
    pub offset_from_self: i64,

    /// Always exactly one entry once the signature has been parsed
    pub results: Vec<TypeId>,

    /// Bytes taken by all parameters, kept up to date by `TypeTable::add_param`
    pub params_size: i64,
}

impl Signature {
    pub fn result(&self) -> Option<TypeId> {
        self.results.first().copied()
    }
}

// Builtins live at fixed indices so they can be referred to without a lookup
const BUILTIN_KINDS: [TypeKind; 14] = [
    TypeKind::Void,
    TypeKind::Null,
    TypeKind::Int8,
    TypeKind::Int16,
    TypeKind::Int32,
    TypeKind::Int,
    TypeKind::Uint8,
    TypeKind::Uint16,
    TypeKind::Uint32,
    TypeKind::Uint,
    TypeKind::Bool,
    TypeKind::Char,
    TypeKind::Real32,
    TypeKind::Real,
];

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const NULL: TypeId = TypeId(1);
    pub const INT8: TypeId = TypeId(2);
    pub const INT16: TypeId = TypeId(3);
    pub const INT32: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const UINT8: TypeId = TypeId(6);
    pub const UINT16: TypeId = TypeId(7);
    pub const UINT32: TypeId = TypeId(8);
    pub const UINT: TypeId = TypeId(9);
    pub const BOOL: TypeId = TypeId(10);
    pub const CHAR: TypeId = TypeId(11);
    pub const REAL32: TypeId = TypeId(12);
    pub const REAL: TypeId = TypeId(13);

    /// ^void, the opaque pointer used for interface self fields
    pub const PTR_VOID: TypeId = TypeId(14);
}

/// The single arena that owns every type in the program.
#[derive(Clone, Debug)]
pub struct TypeTable {
    types: Vec<TypeKind>,

    // Forward types that have been created but not yet patched
    pending_forwards: Vec<TypeId>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(BUILTIN_KINDS.len() + 64);
        types.extend(BUILTIN_KINDS.iter().cloned());
        types.push(TypeKind::Pointer {
            base: TypeId::VOID,
        });

        TypeTable {
            types,
            pending_forwards: Vec::new(),
        }
    }

    /// Names of the builtin types, as they are declared in the universe module
    pub fn builtin_names() -> [(&'static str, TypeId); 13] {
        [
            ("void", TypeId::VOID),
            ("int8", TypeId::INT8),
            ("int16", TypeId::INT16),
            ("int32", TypeId::INT32),
            ("int", TypeId::INT),
            ("uint8", TypeId::UINT8),
            ("uint16", TypeId::UINT16),
            ("uint32", TypeId::UINT32),
            ("uint", TypeId::UINT),
            ("bool", TypeId::BOOL),
            ("char", TypeId::CHAR),
            ("real32", TypeId::REAL32),
            ("real", TypeId::REAL),
        ]
    }

    pub fn add(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);

        if matches!(kind, TypeKind::Forward { .. }) {
            self.pending_forwards.push(id);
        }

        self.types.push(kind);
        id
    }

    pub fn add_pointer_to(&mut self, base: TypeId) -> TypeId {
        self.add(TypeKind::Pointer { base })
    }

    pub fn get(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Rewrites a forward placeholder with the concrete type.
    /// Every pointer built against the placeholder now sees the real type.
    pub fn patch_forward(&mut self, forward: TypeId, concrete: TypeId) {
        let kind = self.types[concrete.index()].to_owned();
        self.types[forward.index()] = kind;
        self.pending_forwards.retain(|pending| *pending != forward);

        type_log!("Patched forward type #", {forward.index()}, " with #", {concrete.index()});
    }

    /// Forward types are created before the identifier they belong to
    pub fn bind_forward(&mut self, forward: TypeId, ident: IdentId) {
        if let TypeKind::Forward { ident: pending } = &mut self.types[forward.index()] {
            *pending = ident;
        }
    }

    /// The identifier of the first forward type still waiting for its declaration
    pub fn first_unresolved_forward(&self) -> Option<IdentId> {
        self.pending_forwards
            .iter()
            .find_map(|id| match self.get(*id) {
                TypeKind::Forward { ident } => Some(*ident),
                _ => None,
            })
    }

    pub fn is_forward(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeKind::Forward { .. })
    }

    /// Size in bytes, or None when the size doesn't fit in an i64.
    /// Forward types only ever sit behind a pointer, so they never contribute a size.
    pub fn size_of(&self, id: TypeId) -> Option<i64> {
        let size = match self.get(id) {
            TypeKind::Void | TypeKind::Forward { .. } => 0,
            TypeKind::Int8 | TypeKind::Uint8 | TypeKind::Bool | TypeKind::Char => 1,
            TypeKind::Int16 | TypeKind::Uint16 => 2,
            TypeKind::Int32 | TypeKind::Uint32 | TypeKind::Real32 => 4,
            TypeKind::Int | TypeKind::Uint | TypeKind::Real => 8,
            TypeKind::Null | TypeKind::Pointer { .. } | TypeKind::Function { .. } => POINTER_SIZE,
            TypeKind::Array { length: -1, .. } => OPEN_ARRAY_SIZE,
            TypeKind::Array { base, length } => length.checked_mul(self.size_of(*base)?)?,
            TypeKind::BoundedString { capacity } => *capacity,
            TypeKind::Struct { fields } | TypeKind::Interface { fields } => match fields.last() {
                Some(last) => last.offset.checked_add(self.size_of(last.data_type)?)?,
                None => 0,
            },
        };

        Some(size)
    }

    /// Structured types are passed around by reference
    /// and can't be used as default parameter values.
    pub fn is_structured(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            TypeKind::Array { .. }
                | TypeKind::BoundedString { .. }
                | TypeKind::Struct { .. }
                | TypeKind::Interface { .. }
        )
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            TypeKind::Int8
                | TypeKind::Int16
                | TypeKind::Int32
                | TypeKind::Int
                | TypeKind::Uint8
                | TypeKind::Uint16
                | TypeKind::Uint32
                | TypeKind::Uint
        )
    }

    pub fn is_real(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeKind::Real32 | TypeKind::Real)
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.is_integer(id) || self.is_real(id)
    }

    pub fn is_ordinal(&self, id: TypeId) -> bool {
        self.is_integer(id) || matches!(self.get(id), TypeKind::Bool | TypeKind::Char)
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeKind::Pointer { .. } | TypeKind::Null)
    }

    pub fn pointer_base(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            TypeKind::Pointer { base } => Some(*base),
            _ => None,
        }
    }

    pub fn fields(&self, id: TypeId) -> &[Field] {
        match self.get(id) {
            TypeKind::Struct { fields } | TypeKind::Interface { fields } => fields,
            _ => &[],
        }
    }

    pub fn find_field(&self, id: TypeId, name: StringId) -> Option<&Field> {
        self.fields(id).iter().find(|field| field.name == name)
    }

    /// Appends a field at the next offset and returns that offset.
    /// Callers check for duplicate names first.
    /// Returns None, leaving the owner untouched, if the grown type would be too large.
    pub fn add_field(&mut self, owner: TypeId, name: StringId, data_type: TypeId) -> Option<i64> {
        let offset = self.size_of(owner)?;
        offset.checked_add(self.size_of(data_type)?)?;

        match &mut self.types[owner.index()] {
            TypeKind::Struct { fields } | TypeKind::Interface { fields } => {
                fields.push(Field {
                    name,
                    data_type,
                    offset,
                });
            }
            _ => {
                type_log!(Red "Tried to add a field to a type without fields");
            }
        }

        Some(offset)
    }

    /// Parameters are laid out one after another like fields.
    /// Returns the new parameter's offset, or None if the parameters would be too large.
    pub fn add_param(
        &self,
        signature: &mut Signature,
        name: StringId,
        data_type: TypeId,
        default_value: Option<ConstValue>,
    ) -> Option<i64> {
        let offset = signature.params_size;
        let end = offset.checked_add(self.size_of(data_type)?)?;

        signature.params.push(Param {
            name,
            data_type,
            offset,
            default_value,
        });
        signature.params_size = end;

        Some(offset)
    }

    pub fn signature(&self, id: TypeId) -> Option<&Signature> {
        match self.get(id) {
            TypeKind::Function { signature } => Some(signature),
            _ => None,
        }
    }

    /// Structural equivalence.
    /// Recursive types are handled by assuming pairs already under comparison are equal.
    pub fn equivalent(&self, left: TypeId, right: TypeId) -> bool {
        let mut assumed = FxHashSet::default();
        self.equivalent_inner(left, right, &mut assumed)
    }

    fn equivalent_inner(
        &self,
        left: TypeId,
        right: TypeId,
        assumed: &mut FxHashSet<(TypeId, TypeId)>,
    ) -> bool {
        if left == right || !assumed.insert((left, right)) {
            return true;
        }

        match (self.get(left), self.get(right)) {
            (TypeKind::Pointer { base: a }, TypeKind::Pointer { base: b }) => {
                self.equivalent_inner(*a, *b, assumed)
            }

            (
                TypeKind::Array {
                    base: a,
                    length: len_a,
                },
                TypeKind::Array {
                    base: b,
                    length: len_b,
                },
            ) => len_a == len_b && self.equivalent_inner(*a, *b, assumed),

            (
                TypeKind::BoundedString { capacity: a },
                TypeKind::BoundedString { capacity: b },
            ) => a == b,

            (TypeKind::Struct { fields: a }, TypeKind::Struct { fields: b })
            | (TypeKind::Interface { fields: a }, TypeKind::Interface { fields: b }) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(field_a, field_b)| {
                        field_a.name == field_b.name
                            && self.equivalent_inner(field_a.data_type, field_b.data_type, assumed)
                    })
            }

            (TypeKind::Function { signature: a }, TypeKind::Function { signature: b }) => {
                // Receivers don't take part in method type equivalence
                let skip = usize::from(a.is_method);

                a.is_method == b.is_method
                    && a.params.len() == b.params.len()
                    && a.params.iter().zip(b.params.iter()).skip(skip).all(|(pa, pb)| {
                        self.equivalent_inner(pa.data_type, pb.data_type, assumed)
                            && pa.default_value == pb.default_value
                    })
                    && a.results.len() == b.results.len()
                    && a.results
                        .iter()
                        .zip(b.results.iter())
                        .all(|(ra, rb)| self.equivalent_inner(*ra, *rb, assumed))
            }

            (TypeKind::Forward { ident: a }, TypeKind::Forward { ident: b }) => a == b,

            (a, b) => a == b && is_builtin_kind(a),
        }
    }

    /// Whether a value of the right type can be assigned to the left type
    pub fn compatible(&self, left: TypeId, right: TypeId) -> bool {
        if self.equivalent(left, right) {
            return true;
        }

        // Integers and reals convert within their own family
        if (self.is_integer(left) && self.is_integer(right))
            || (self.is_real(left) && self.is_real(right))
        {
            return true;
        }

        // Any pointer converts to and from ^void, and null converts to any pointer
        if self.is_pointer(left) && self.is_pointer(right) {
            let void_pointer = |id: TypeId| {
                matches!(self.get(id), TypeKind::Null) || self.pointer_base(id) == Some(TypeId::VOID)
            };
            return void_pointer(left) || void_pointer(right);
        }

        matches!(
            (self.get(left), self.get(right)),
            (TypeKind::BoundedString { .. }, TypeKind::BoundedString { .. })
        )
    }

    /// A short human-readable spelling for diagnostics
    pub fn display(&self, id: TypeId, string_table: &StringTable) -> String {
        match self.get(id) {
            TypeKind::Void => String::from("void"),
            TypeKind::Null => String::from("null"),
            TypeKind::Int8 => String::from("int8"),
            TypeKind::Int16 => String::from("int16"),
            TypeKind::Int32 => String::from("int32"),
            TypeKind::Int => String::from("int"),
            TypeKind::Uint8 => String::from("uint8"),
            TypeKind::Uint16 => String::from("uint16"),
            TypeKind::Uint32 => String::from("uint32"),
            TypeKind::Uint => String::from("uint"),
            TypeKind::Bool => String::from("bool"),
            TypeKind::Char => String::from("char"),
            TypeKind::Real32 => String::from("real32"),
            TypeKind::Real => String::from("real"),
            TypeKind::Pointer { base } => format!("^{}", self.display(*base, string_table)),
            TypeKind::Array { base, length: -1 } => {
                format!("[]{}", self.display(*base, string_table))
            }
            TypeKind::Array { base, length } => {
                format!("[{length}]{}", self.display(*base, string_table))
            }
            TypeKind::BoundedString { capacity } => format!("str[{capacity}]"),

            // Only field names, so recursive types don't recurse forever
            TypeKind::Struct { fields } => {
                format!("struct {{{}}}", field_names(fields, string_table))
            }
            TypeKind::Interface { fields } => {
                format!("interface {{{}}}", field_names(fields.get(1..).unwrap_or_default(), string_table))
            }

            TypeKind::Function { signature } => {
                let params: Vec<String> = signature
                    .params
                    .iter()
                    .map(|param| {
                        format!(
                            "{}: {}",
                            string_table.resolve(param.name),
                            self.display(param.data_type, string_table)
                        )
                    })
                    .collect();

                let result = signature
                    .result()
                    .map_or_else(|| String::from("void"), |r| self.display(r, string_table));

                format!("fn ({}): {}", params.join(", "), result)
            }

            TypeKind::Forward { .. } => String::from("<forward>"),
        }
    }
}

fn is_builtin_kind(kind: &TypeKind) -> bool {
    BUILTIN_KINDS.contains(kind)
}

fn field_names(fields: &[Field], string_table: &StringTable) -> String {
    fields
        .iter()
        .map(|field| string_table.resolve(field.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "tests/datatypes_tests.rs"]
mod tests;
