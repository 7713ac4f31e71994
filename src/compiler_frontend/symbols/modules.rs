use crate::compiler_frontend::string_interning::StringId;
use crate::settings::IMPORTS_CAPACITY;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ModuleId(u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Holds the predeclared types and constants
pub const UNIVERSE_MODULE: ModuleId = ModuleId(0);

/// The root file is always the first module added after the universe
pub const ROOT_MODULE: ModuleId = ModuleId(1);

#[derive(Clone, Debug)]
pub struct Module {
    /// Canonical path, the identity of the module
    pub path: PathBuf,

    /// Source folder with a trailing separator, imports are appended to it
    pub folder: String,

    /// File stem, used to qualify identifiers from this module
    pub name: StringId,

    pub imports: FxHashSet<ModuleId>,
}

#[derive(Clone, Debug, Default)]
pub struct ModuleTable {
    modules: Vec<Module>,
    by_path: FxHashMap<PathBuf, ModuleId>,

    // Modules whose parse hasn't finished yet
    in_progress: FxHashSet<ModuleId>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf, folder: String, name: StringId) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);

        self.by_path.insert(path.to_owned(), id);
        self.modules.push(Module {
            path,
            folder,
            name,
            imports: FxHashSet::with_capacity_and_hasher(IMPORTS_CAPACITY, Default::default()),
        });

        id
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.index()]
    }

    pub fn find_by_path(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    /// Only user modules can be named, never the universe
    pub fn find_by_name(&self, name: StringId) -> Option<ModuleId> {
        self.modules
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, module)| module.name == name)
            .map(|(index, _)| ModuleId(index as u32))
    }

    /// Two modules can share a file stem, the one the importer actually imports wins
    pub fn find_imported_by_name(&self, importer: ModuleId, name: StringId) -> Option<ModuleId> {
        self.modules[importer.index()]
            .imports
            .iter()
            .copied()
            .find(|imported| self.get(*imported).name == name)
            .or_else(|| self.find_by_name(name))
    }

    /// Records an import edge. Returns false if the edge already existed.
    pub fn add_import(&mut self, importer: ModuleId, imported: ModuleId) -> bool {
        self.modules[importer.index()].imports.insert(imported)
    }

    pub fn imports(&self, importer: ModuleId, imported: ModuleId) -> bool {
        self.modules[importer.index()].imports.contains(&imported)
    }

    pub fn begin_parse(&mut self, id: ModuleId) {
        self.in_progress.insert(id);
    }

    pub fn finish_parse(&mut self, id: ModuleId) {
        self.in_progress.remove(&id);
    }

    pub fn is_in_progress(&self, id: ModuleId) -> bool {
        self.in_progress.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(index, module)| (ModuleId(index as u32), module))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
