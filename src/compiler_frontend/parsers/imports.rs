//! import     = "import" (importItem | "(" {importItem ";"} ")")
//! importItem = stringLiteral
//!
//! Each imported file is parsed at most once, however many modules import it.
//! Every import still records its own edge in the importing module.

use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorType};
use crate::compiler_frontend::parsers::program::parse_module_file;
use crate::compiler_frontend::source_paths::resolve_import_path;
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TokenKind};
use crate::{import_log, return_rule_error, return_syntax_error};

pub fn parse_import(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    token_stream.eat(&TokenKind::Import)?;

    if token_stream.current_token_kind() != &TokenKind::OpenParenthesis {
        return parse_import_item(token_stream, context);
    }

    token_stream.advance();

    while let TokenKind::StringLiteral(_) = token_stream.current_token_kind() {
        parse_import_item(token_stream, context)?;
        token_stream.eat_separator(&TokenKind::CloseParenthesis)?;
    }

    token_stream.eat(&TokenKind::CloseParenthesis)
}

fn parse_import_item(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    let location = token_stream.current_error_location();

    let literal = match token_stream.current_token_kind() {
        TokenKind::StringLiteral(literal) => *literal,
        found => return_syntax_error!(
            format!("Import path expected but {} found", found.spelling()),
            location,
            {
                CompilationStage => "Import Parsing",
                PrimarySuggestion => "Import paths are string literals relative to this file",
            }
        ),
    };

    let importer = context.blocks.module;
    let folder = context.modules.get(importer).folder.to_owned();
    let path = resolve_import_path(&folder, context.name(literal));

    let imported = match context.modules.find_by_path(&path) {
        Some(imported) if context.modules.is_in_progress(imported) => {
            return_rule_error!(
                format!("Cyclic import of {}", path.display()),
                location,
                {
                    PrimarySuggestion => "Move the shared declarations into a module both files can import",
                }
            )
        }

        Some(imported) => {
            import_log!("Reusing module ", {path.display()});
            imported
        }

        None => {
            if context.import_depth() >= context.config.max_import_depth {
                return_rule_error!(
                    format!(
                        "Imports are nested more than {} levels deep",
                        context.config.max_import_depth
                    ),
                    location
                )
            }

            import_log!("Importing ", {path.display()});
            parse_module_file(context, &path).map_err(|e| {
                // A missing file is reported at the import that asked for it
                if e.error_type == ErrorType::File && e.location.scope == path {
                    CompilerError::new(e.msg, location.to_owned(), e.error_type)
                } else {
                    e
                }
            })?
        }
    };

    context.modules.add_import(importer, imported);
    token_stream.advance();
    Ok(())
}
