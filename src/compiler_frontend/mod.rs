pub mod codegen;
pub mod datatypes;
pub mod host_functions;
pub mod optimizers {
    pub mod constant_folding;
}
pub mod parsers;
pub mod source_paths;
pub mod string_interning;
pub mod symbols;
pub mod tokenizer {
    pub mod tokenizer;
    pub mod tokens;
}

pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod display_messages;
}
pub use compiler_messages::compiler_errors;
pub use compiler_messages::display_messages;

use crate::compiler_frontend::codegen::instructions::{CodeGen, Instruction};
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::datatypes::{TypeId, TypeTable};
use crate::compiler_frontend::host_functions::HostRegistry;
use crate::compiler_frontend::optimizers::constant_folding::ConstValue;
use crate::compiler_frontend::source_paths::SourceProvider;
use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::symbols::blocks::{BlockId, Blocks};
use crate::compiler_frontend::symbols::identifiers::{
    Ident, IdentId, IdentKind, IdentPayload, IdentTable,
};
use crate::compiler_frontend::symbols::modules::{ModuleId, ModuleTable, UNIVERSE_MODULE};
use crate::compiler_frontend::tokenizer::tokens::TextLocation;
use crate::settings::{Config, RESULT_PARAM_NAME, SELF_PARAM_NAME, UNIVERSE_MODULE_PATH};
use crate::{decl_log, return_compiler_error, return_rule_error};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Names the compiler synthesises itself
#[derive(Clone, Copy, Debug)]
pub struct ReservedNames {
    pub self_param: StringId,
    pub result_param: StringId,
    pub entry_function: StringId,
}

/// What the debug info of the code being generated refers to
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugContext {
    pub file: PathBuf,
    pub function: Option<StringId>,
}

impl DebugContext {
    pub fn new(file: &Path) -> Self {
        DebugContext {
            file: file.to_path_buf(),
            function: None,
        }
    }
}

/// Saved state of the importing module while an imported module is parsed
#[derive(Debug)]
pub struct ModuleFrame {
    module: ModuleId,
    debug: DebugContext,
}

/// Storage for one global variable.
/// Globals are initialised with constants at compile time.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalSlot {
    pub name: StringId,
    pub data_type: TypeId,
    pub value: Option<ConstValue>,
}

/// All the state shared by the declaration parsers.
/// Passed explicitly to every parsing function, there are no global tables.
pub struct CompilerFrontend<'a> {
    pub config: &'a Config,
    pub sources: &'a dyn SourceProvider,
    pub host_functions: &'a HostRegistry,

    pub string_table: StringTable,
    pub types: TypeTable,
    pub idents: IdentTable,
    pub modules: ModuleTable,
    pub blocks: Blocks,
    pub codegen: CodeGen,
    pub globals: Vec<GlobalSlot>,

    pub debug: DebugContext,
    pub reserved: ReservedNames,
    import_depth: usize,
}

impl<'a> CompilerFrontend<'a> {
    pub fn new(
        config: &'a Config,
        sources: &'a dyn SourceProvider,
        host_functions: &'a HostRegistry,
    ) -> Result<Self, CompilerError> {
        let mut string_table = StringTable::new();

        let reserved = ReservedNames {
            self_param: string_table.intern(SELF_PARAM_NAME),
            result_param: string_table.intern(RESULT_PARAM_NAME),
            entry_function: string_table.intern(&config.entry_function),
        };

        let mut frontend = CompilerFrontend {
            config,
            sources,
            host_functions,
            string_table,
            types: TypeTable::new(),
            idents: IdentTable::new(),
            modules: ModuleTable::new(),
            blocks: Blocks::new(),
            codegen: CodeGen::new(),
            globals: Vec::new(),
            debug: DebugContext::new(Path::new(UNIVERSE_MODULE_PATH)),
            reserved,
            import_depth: 0,
        };

        frontend.declare_universe()?;
        Ok(frontend)
    }

    /// Module 0 holds the builtin types and constants every module can see
    fn declare_universe(&mut self) -> Result<(), CompilerError> {
        let universe_name = self.string_table.intern(UNIVERSE_MODULE_PATH);
        let universe = self.modules.add(
            PathBuf::from(UNIVERSE_MODULE_PATH),
            String::new(),
            universe_name,
        );

        if universe != UNIVERSE_MODULE {
            return_compiler_error!("Universe module must be the first module");
        }

        self.blocks.module = universe;

        for (name, data_type) in TypeTable::builtin_names() {
            let name = self.string_table.intern(name);
            let mut ident = self.new_ident(name, IdentKind::Type, data_type, TextLocation::default());
            ident.exported = true;
            self.declare(ident)?;
        }

        let constants = [
            ("true", TypeId::BOOL, ConstValue::Bool(true)),
            ("false", TypeId::BOOL, ConstValue::Bool(false)),
            ("null", TypeId::NULL, ConstValue::Null),
        ];

        for (name, data_type, value) in constants {
            let name = self.string_table.intern(name);
            let mut ident = self.new_ident(name, IdentKind::Const, data_type, TextLocation::default());
            ident.exported = true;
            ident.payload = IdentPayload::Const(value);
            self.declare(ident)?;
        }

        Ok(())
    }

    pub fn intern(&mut self, name: &str) -> StringId {
        self.string_table.intern(name)
    }

    pub fn name(&self, id: StringId) -> &str {
        self.string_table.resolve(id)
    }

    pub fn type_name(&self, id: TypeId) -> String {
        self.types.display(id, &self.string_table)
    }

    /// Error location inside the file currently being parsed
    pub fn error_location(&self, location: TextLocation) -> ErrorLocation {
        location.to_error_location(&self.debug.file)
    }

    /// An identifier in the current module and block with no payload yet
    pub fn new_ident(
        &self,
        name: StringId,
        kind: IdentKind,
        data_type: TypeId,
        location: TextLocation,
    ) -> Ident {
        Ident {
            name,
            kind,
            exported: false,
            data_type,
            payload: IdentPayload::None,
            module: self.blocks.module,
            block: self.blocks.current(),
            receiver: None,
            location,
        }
    }

    /// Binds an identifier. Fails if the name is already taken in the same scope.
    pub fn declare(&mut self, ident: Ident) -> Result<IdentId, CompilerError> {
        let location = self.error_location(ident.location);

        if ident.exported && ident.block != BlockId::GLOBAL {
            return_rule_error!(
                format!("Local identifier {} cannot be exported", self.name(ident.name)),
                location,
                {
                    PrimarySuggestion => "Remove the '*' export mark",
                }
            )
        }

        decl_log!(
            "Declared ",
            {ident.kind.to_str()},
            " ",
            {self.name(ident.name)},
            " in module ",
            {ident.module.index()},
            " block ",
            {ident.block.index()}
        );

        let name = ident.name;
        match self.idents.insert(ident) {
            Ok(id) => Ok(id),
            Err(_) => return_rule_error!(
                format!("Duplicate identifier {}", self.name(name)),
                location,
                {
                    PrimarySuggestion => "Rename one of the declarations",
                }
            ),
        }
    }

    /// Type declarations first check for a forward placeholder with the same name,
    /// which gets patched instead of being reported as a duplicate.
    pub fn declare_type(
        &mut self,
        name: StringId,
        exported: bool,
        data_type: TypeId,
        location: TextLocation,
    ) -> Result<IdentId, CompilerError> {
        let existing = self
            .idents
            .find_in_scope(self.blocks.module, self.blocks.current(), name);

        if let Some(existing) = existing
            && !self.types.is_forward(data_type)
        {
            let ident = self.idents.get(existing);

            if ident.kind == IdentKind::Type && self.types.is_forward(ident.data_type) {
                let forward = ident.data_type;
                self.types.patch_forward(forward, data_type);

                let ident = self.idents.get_mut(existing);
                ident.exported |= exported;
                ident.location = location;
                return Ok(existing);
            }
        }

        let mut ident = self.new_ident(name, IdentKind::Type, data_type, location);
        ident.exported = exported;
        self.declare(ident)
    }

    /// Allocates storage for a variable in global memory or the current function frame
    pub fn declare_variable(
        &mut self,
        name: StringId,
        exported: bool,
        data_type: TypeId,
        location: TextLocation,
    ) -> Result<IdentId, CompilerError> {
        let payload = if self.blocks.is_global() {
            self.globals.push(GlobalSlot {
                name,
                data_type,
                value: None,
            });
            IdentPayload::Global {
                slot: self.globals.len() - 1,
            }
        } else {
            let offset = self
                .types
                .size_of(data_type)
                .and_then(|size| self.blocks.allocate_local(size));

            let Some(offset) = offset else {
                return_rule_error!(
                    format!("Local variable {} is too large", self.name(name)),
                    self.error_location(location)
                )
            };

            IdentPayload::Local { offset }
        };

        let mut ident = self.new_ident(name, IdentKind::Variable, data_type, location);
        ident.exported = exported;
        ident.payload = payload;
        self.declare(ident)
    }

    /// Saves the importing module's context before parsing an imported file
    pub fn push_module_frame(&mut self, path: &Path) -> ModuleFrame {
        self.import_depth += 1;

        ModuleFrame {
            module: self.blocks.module,
            debug: std::mem::replace(&mut self.debug, DebugContext::new(path)),
        }
    }

    pub fn pop_module_frame(&mut self, frame: ModuleFrame) {
        self.import_depth = self.import_depth.saturating_sub(1);
        self.blocks.module = frame.module;
        self.debug = frame.debug;
    }

    pub fn import_depth(&self) -> usize {
        self.import_depth
    }

    pub fn finish(self) -> CompiledProgram {
        CompiledProgram {
            string_table: self.string_table,
            types: self.types,
            idents: self.idents,
            modules: self.modules,
            code: self.codegen.code().to_vec(),
            globals: self.globals,
        }
    }
}

/// Everything the front end produced for a whole program
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub string_table: StringTable,
    pub types: TypeTable,
    pub idents: IdentTable,
    pub modules: ModuleTable,
    pub code: Vec<Instruction>,
    pub globals: Vec<GlobalSlot>,
}

#[derive(Debug, Serialize)]
pub struct ProgramSummary {
    pub modules: Vec<ModuleSummary>,
    pub declarations: Vec<DeclarationSummary>,
    pub globals: Vec<GlobalSummary>,
    pub code: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ModuleSummary {
    pub path: String,
    pub name: String,
    pub imports: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeclarationSummary {
    pub module: String,
    pub name: String,
    pub kind: &'static str,
    pub exported: bool,
    pub data_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GlobalSummary {
    pub slot: usize,
    pub name: String,
    pub data_type: String,
    pub value: Option<String>,
}

impl CompiledProgram {
    /// Finds a module scope identifier by module name and identifier name
    pub fn find(&self, module_name: &str, name: &str) -> Option<&Ident> {
        let module_name = self.string_table.get(module_name)?;
        let name = self.string_table.get(name)?;
        let module = self.modules.find_by_name(module_name)?;

        self.idents
            .find_in_module(module, name)
            .map(|id| self.idents.get(id))
    }

    pub fn summary(&self) -> ProgramSummary {
        let modules = self
            .modules
            .iter()
            .skip(1)
            .map(|(_, module)| {
                let mut imports: Vec<String> = module
                    .imports
                    .iter()
                    .map(|id| self.modules.get(*id).path.display().to_string())
                    .collect();
                imports.sort();

                ModuleSummary {
                    path: module.path.display().to_string(),
                    name: self.string_table.resolve(module.name).to_owned(),
                    imports,
                }
            })
            .collect();

        let declarations = self
            .idents
            .iter()
            .filter(|(_, ident)| ident.module != UNIVERSE_MODULE && ident.block == BlockId::GLOBAL)
            .map(|(_, ident)| DeclarationSummary {
                module: self
                    .string_table
                    .resolve(self.modules.get(ident.module).name)
                    .to_owned(),
                name: self.string_table.resolve(ident.name).to_owned(),
                kind: ident.kind.to_str(),
                exported: ident.exported,
                data_type: self.types.display(ident.data_type, &self.string_table),
                value: match &ident.payload {
                    IdentPayload::Const(value) => Some(value.to_string()),
                    IdentPayload::Function { entry, .. } => Some(format!("@{entry}")),
                    _ => None,
                },
            })
            .collect();

        let globals = self
            .globals
            .iter()
            .enumerate()
            .map(|(slot, global)| GlobalSummary {
                slot,
                name: self.string_table.resolve(global.name).to_owned(),
                data_type: self.types.display(global.data_type, &self.string_table),
                value: global.value.as_ref().map(ConstValue::to_string),
            })
            .collect();

        ProgramSummary {
            modules,
            declarations,
            globals,
            code: self.code.iter().map(Instruction::to_string).collect(),
        }
    }

    pub fn summary_json(&self) -> Result<String, CompilerError> {
        match serde_json::to_string_pretty(&self.summary()) {
            Ok(json) => Ok(json),
            Err(e) => return_compiler_error!("Could not serialize program summary: {}", e),
        }
    }
}
