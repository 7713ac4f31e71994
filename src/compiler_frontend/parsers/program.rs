//! program = module
//! module  = [import ";"] decls

use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::codegen::instructions::Instruction;
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::parsers::declarations::{assert_forwards_resolved, parse_decls};
use crate::compiler_frontend::parsers::imports::parse_import;
use crate::compiler_frontend::source_paths::{module_name, normalize_path, source_folder};
use crate::compiler_frontend::symbols::identifiers::{IdentId, IdentPayload};
use crate::compiler_frontend::symbols::modules::{ModuleId, ROOT_MODULE};
use crate::compiler_frontend::tokenizer::tokenizer::tokenize;
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TokenKind};
use crate::{
    import_log, return_compiler_error, return_link_error, timer_log, token_log,
};
use std::path::Path;
use std::time::Instant;

/// Emits the entry stub, parses the root module with everything it imports,
/// then links prototypes and checks that the entry function exists.
pub fn parse_program(
    context: &mut CompilerFrontend,
    root_path: &Path,
) -> Result<(), CompilerError> {
    let _time = Instant::now();

    // Patched into a jump once the entry function body is seen
    context.codegen.emit(Instruction::Nop);

    let root_path = normalize_path(root_path);
    let root = parse_module_file(context, &root_path)?;

    if root != ROOT_MODULE {
        return_compiler_error!("Root module was parsed as module {}", root.index());
    }

    assert_forwards_resolved(context)?;
    resolve_externals(context)?;

    if !context.codegen.main_defined {
        return_link_error!(
            format!("{}() is not defined", context.config.entry_function),
            ErrorLocation::from_path(&root_path),
            {
                PrimarySuggestion => "Add an entry function with a body to the root file",
            }
        )
    }

    timer_log!(_time, "Program parsed in: ");
    Ok(())
}

/// Parses one file as a full module with its own token stream.
/// The importing module's context is saved around the parse and restored afterwards.
pub fn parse_module_file(
    context: &mut CompilerFrontend,
    path: &Path,
) -> Result<ModuleId, CompilerError> {
    let source = context.sources.read_source(path)?;
    let mut token_stream = tokenize(&source, path, &mut context.string_table)?;

    token_log!({token_stream.tokens.len()}, " tokens in ", {path.display()});

    let frame = context.push_module_frame(path);
    let result = parse_module(&mut token_stream, context, path);
    context.pop_module_frame(frame);

    result
}

fn parse_module(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    path: &Path,
) -> Result<ModuleId, CompilerError> {
    let name = context.intern(&module_name(path));
    let module = context
        .modules
        .add(path.to_path_buf(), source_folder(path), name);

    import_log!("Module ", {module.index()}, " is ", {path.display()});

    context.blocks.module = module;
    context.modules.begin_parse(module);

    if token_stream.current_token_kind() == &TokenKind::Import {
        parse_import(token_stream, context)?;
        token_stream.eat(&TokenKind::Semicolon)?;
    }

    parse_decls(token_stream, context)?;
    token_stream.eat(&TokenKind::Eof)?;

    context.modules.finish_parse(module);
    Ok(module)
}

/// Every prototype must name a registered host function.
/// Its reserved instruction becomes a jump to a call stub appended after the program.
fn resolve_externals(context: &mut CompilerFrontend) -> Result<(), CompilerError> {
    let prototypes: Vec<IdentId> = context
        .idents
        .iter()
        .filter(|(_, ident)| ident.is_prototype())
        .map(|(id, _)| id)
        .collect();

    for prototype in prototypes {
        let ident = context.idents.get(prototype).to_owned();
        let IdentPayload::Function {
            prototype_slot: Some(slot),
            ..
        } = ident.payload
        else {
            continue;
        };

        let name = context.name(ident.name).to_owned();
        let location = ident
            .location
            .to_error_location(&context.modules.get(ident.module).path);

        let Some(signature) = context.types.signature(ident.data_type) else {
            return_compiler_error!("Prototype {} has no function type", name);
        };
        let params_size = signature.params_size;
        let num_params = signature.params.len();

        let Some(host_function) = context.host_functions.get(&name) else {
            return_link_error!(
                format!("Unresolved prototype of {name}"),
                location,
                {
                    PrimarySuggestion => "Give the function a body or register a host function with this name",
                }
            )
        };

        if host_function.arity != num_params {
            return_link_error!(
                format!(
                    "Host function {name} takes {} parameters but its prototype declares {num_params}",
                    host_function.arity
                ),
                location
            )
        }

        let call_stub = context.codegen.emit(Instruction::CallExtern(name));
        context.codegen.emit(Instruction::Return { params_size });

        if !context.codegen.patch(slot, Instruction::Goto(call_stub)) {
            return_compiler_error!("Prototype slot {} was never reserved", slot);
        }
    }

    Ok(())
}
