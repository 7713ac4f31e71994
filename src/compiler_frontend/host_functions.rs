//! Functions provided by the embedder.
//!
//! A function declared without a body is a prototype.
//! At link time each prototype is matched by name against this registry.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFunctionDef {
    pub name: String,

    /// Parameters the host expects, including any hidden result pointer
    pub arity: usize,
    pub description: String,
}

impl HostFunctionDef {
    pub fn new(name: impl Into<String>, arity: usize, description: impl Into<String>) -> Self {
        HostFunctionDef {
            name: name.into(),
            arity,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    functions: FxHashMap<String, HostFunctionDef>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same name twice replaces the earlier definition
    pub fn register(&mut self, function: HostFunctionDef) {
        self.functions.insert(function.name.to_owned(), function);
    }

    pub fn get(&self, name: &str) -> Option<&HostFunctionDef> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
