use crate::compiler_frontend::datatypes::TypeId;
use crate::compiler_frontend::optimizers::constant_folding::ConstValue;
use crate::compiler_frontend::string_interning::StringId;
use crate::compiler_frontend::symbols::blocks::{BlockId, Blocks};
use crate::compiler_frontend::symbols::modules::{ModuleId, UNIVERSE_MODULE};
use crate::compiler_frontend::tokenizer::tokens::TextLocation;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentId(u32);

impl IdentId {
    /// Placeholder for a forward type whose identifier is about to be declared
    pub const PENDING: IdentId = IdentId(u32::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentKind {
    Type,
    Const,
    Function,
    Variable,
}

impl IdentKind {
    pub fn to_str(self) -> &'static str {
        match self {
            IdentKind::Type => "type",
            IdentKind::Const => "constant",
            IdentKind::Function => "function",
            IdentKind::Variable => "variable",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum IdentPayload {
    /// Types only carry their TypeId
    None,

    Const(ConstValue),

    /// Entry address in the code buffer.
    /// Prototypes also remember the reserved instruction that gets patched at link time.
    Function {
        entry: usize,
        prototype_slot: Option<usize>,
    },

    Global { slot: usize },
    Local { offset: i64 },
}

#[derive(Clone, Debug)]
pub struct Ident {
    pub name: StringId,
    pub kind: IdentKind,
    pub exported: bool,
    pub data_type: TypeId,
    pub payload: IdentPayload,
    pub module: ModuleId,
    pub block: BlockId,

    /// Methods are keyed by the type their receiver points at
    pub receiver: Option<TypeId>,
    pub location: TextLocation,
}

impl Ident {
    pub fn is_prototype(&self) -> bool {
        matches!(
            self.payload,
            IdentPayload::Function {
                prototype_slot: Some(_),
                ..
            }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct IdentKey {
    module: ModuleId,
    block: BlockId,
    receiver: Option<TypeId>,
    name: StringId,
}

impl IdentKey {
    fn of(ident: &Ident) -> Self {
        IdentKey {
            module: ident.module,
            block: ident.block,
            receiver: ident.receiver,
            name: ident.name,
        }
    }
}

/// Every named entity in the program, in declaration order.
/// The lookup map is keyed by (module, block, receiver, name),
/// so inserting is also the duplicate check.
#[derive(Clone, Debug, Default)]
pub struct IdentTable {
    idents: Vec<Ident>,
    lookup: FxHashMap<IdentKey, IdentId>,
}

impl IdentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing identifier if the name is already taken in that scope
    pub fn insert(&mut self, ident: Ident) -> Result<IdentId, IdentId> {
        let key = IdentKey::of(&ident);

        if let Some(existing) = self.lookup.get(&key) {
            return Err(*existing);
        }

        let id = IdentId(self.idents.len() as u32);
        self.lookup.insert(key, id);
        self.idents.push(ident);

        Ok(id)
    }

    pub fn get(&self, id: IdentId) -> &Ident {
        &self.idents[id.index()]
    }

    pub fn get_mut(&mut self, id: IdentId) -> &mut Ident {
        &mut self.idents[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (IdentId, &Ident)> {
        self.idents
            .iter()
            .enumerate()
            .map(|(index, ident)| (IdentId(index as u32), ident))
    }

    pub fn len(&self) -> usize {
        self.idents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }

    /// Exact lookup in one scope, no walking outwards
    pub fn find_in_scope(
        &self,
        module: ModuleId,
        block: BlockId,
        name: StringId,
    ) -> Option<IdentId> {
        self.lookup
            .get(&IdentKey {
                module,
                block,
                receiver: None,
                name,
            })
            .copied()
    }

    pub fn find_method(
        &self,
        module: ModuleId,
        receiver: TypeId,
        name: StringId,
    ) -> Option<IdentId> {
        self.lookup
            .get(&IdentKey {
                module,
                block: BlockId::GLOBAL,
                receiver: Some(receiver),
                name,
            })
            .copied()
    }

    /// Walks the active blocks from innermost to module scope,
    /// then falls back to the universe module.
    pub fn find(&self, blocks: &Blocks, name: StringId) -> Option<IdentId> {
        blocks
            .active()
            .rev()
            .find_map(|block| self.find_in_scope(blocks.module, block, name))
            .or_else(|| self.find_in_scope(UNIVERSE_MODULE, BlockId::GLOBAL, name))
    }

    /// Module scope of an imported module
    pub fn find_in_module(&self, module: ModuleId, name: StringId) -> Option<IdentId> {
        self.find_in_scope(module, BlockId::GLOBAL, name)
    }
}
