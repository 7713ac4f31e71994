use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::TypeId;
use crate::compiler_frontend::parsers::type_grammar::parse_type;
use crate::compiler_frontend::string_interning::StringId;
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TextLocation, TokenKind};
use crate::return_rule_error;

/// A name being declared, with its own export mark
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeclaredName {
    pub name: StringId,
    pub exported: bool,
    pub location: TextLocation,
}

/// exportMark = ["*"]
pub fn parse_export_mark(token_stream: &mut FileTokens) -> bool {
    if token_stream.current_token_kind() == &TokenKind::Multiply {
        token_stream.advance();
        return true;
    }

    false
}

/// ident exportMark
pub fn parse_declared_name(token_stream: &mut FileTokens) -> Result<DeclaredName, CompilerError> {
    let location = token_stream.current_location();
    let name = token_stream.eat_ident()?;
    let exported = parse_export_mark(token_stream);

    Ok(DeclaredName {
        name,
        exported,
        location,
    })
}

/// identList = ident exportMark {"," ident exportMark}
pub fn parse_ident_list(
    token_stream: &mut FileTokens,
    capacity: usize,
) -> Result<Vec<DeclaredName>, CompilerError> {
    let mut names = Vec::with_capacity(capacity.min(8));

    loop {
        token_stream.check_ident()?;

        if names.len() >= capacity {
            return_rule_error!(
                "Too many identifiers",
                token_stream.current_error_location(),
                {
                    CompilationStage => "Declaration Parsing",
                    PrimarySuggestion => "Split the list into several declarations",
                }
            )
        }

        names.push(parse_declared_name(token_stream)?);

        if token_stream.current_token_kind() != &TokenKind::Comma {
            break;
        }
        token_stream.advance();
    }

    Ok(names)
}

/// typedIdentList = identList ":" type
pub fn parse_typed_ident_list(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    capacity: usize,
) -> Result<(Vec<DeclaredName>, TypeId), CompilerError> {
    let names = parse_ident_list(token_stream, capacity)?;
    token_stream.eat(&TokenKind::Colon)?;
    let data_type = parse_type(token_stream, context)?;

    Ok((names, data_type))
}
