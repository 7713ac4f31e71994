//! decls = decl {";" decl}
//! decl  = typeDecl | constDecl | varDecl | shortVarDecl | fnDecl
//!
//! Whether a declaration folds its initializer into a constant or emits code
//! is decided by one thing only: whether the current block depth is zero.

use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::codegen::instructions::Instruction;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::{Signature, TypeKind};
use crate::compiler_frontend::parsers::expressions::parse_const_expression;
use crate::compiler_frontend::parsers::identifier_lists::{
    parse_declared_name, parse_export_mark, parse_typed_ident_list,
};
use crate::compiler_frontend::parsers::signatures::{parse_receiver_signature, parse_signature};
use crate::compiler_frontend::parsers::statements::{
    parse_assignment, parse_decl_assignment, parse_function_block,
};
use crate::compiler_frontend::parsers::type_grammar::parse_type;
use crate::compiler_frontend::symbols::identifiers::{IdentKind, IdentPayload};
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TokenKind};
use crate::settings::MAX_IDENTS;
use crate::{decl_log, return_compiler_error, return_rule_error, return_syntax_error};

type ItemParser = fn(&mut FileTokens, &mut CompilerFrontend) -> Result<(), CompilerError>;

pub fn parse_decls(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    loop {
        parse_decl(token_stream, context)?;

        if token_stream.current_token_kind() != &TokenKind::Semicolon {
            break;
        }
        token_stream.advance();
    }

    Ok(())
}

pub fn parse_decl(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    match token_stream.current_token_kind() {
        TokenKind::Type => parse_type_decl(token_stream, context),
        TokenKind::Const => parse_const_decl(token_stream, context),
        TokenKind::Var => parse_var_decl(token_stream, context),
        TokenKind::Ident(_) => parse_short_var_decl(token_stream, context),
        TokenKind::Fn => parse_fn_decl(token_stream, context),

        TokenKind::Eof if context.blocks.is_global() => Ok(()),

        found => return_syntax_error!(
            format!("Declaration expected but {} found", found.spelling()),
            token_stream.current_error_location(),
            {
                CompilationStage => "Declaration Parsing",
            }
        ),
    }
}

/// keyword (item | "(" {item ";"} ")")
fn parse_decl_group(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    parse_item: ItemParser,
) -> Result<(), CompilerError> {
    if token_stream.current_token_kind() != &TokenKind::OpenParenthesis {
        return parse_item(token_stream, context);
    }

    token_stream.advance();

    while let TokenKind::Ident(_) = token_stream.current_token_kind() {
        parse_item(token_stream, context)?;
        token_stream.eat_separator(&TokenKind::CloseParenthesis)?;
    }

    token_stream.eat(&TokenKind::CloseParenthesis)
}

/// typeDecl = "type" (typeDeclItem | "(" {typeDeclItem ";"} ")")
/// Every forward type has to be resolved by the end of the group.
/// A run of consecutive type declarations counts as one group.
pub fn parse_type_decl(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    token_stream.eat(&TokenKind::Type)?;
    parse_decl_group(token_stream, context, parse_type_decl_item)?;

    let group_continues = token_stream.current_token_kind() == &TokenKind::Semicolon
        && token_stream.peek_next_token() == Some(&TokenKind::Type);

    if group_continues {
        return Ok(());
    }

    assert_forwards_resolved(context)
}

/// typeDeclItem = ident exportMark "=" type
fn parse_type_decl_item(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    let declared = parse_declared_name(token_stream)?;
    token_stream.eat(&TokenKind::Assign)?;
    let data_type = parse_type(token_stream, context)?;

    decl_log!("type ", {context.name(declared.name)}, " = ", {context.type_name(data_type)});
    context.declare_type(declared.name, declared.exported, data_type, declared.location)?;
    Ok(())
}

pub fn assert_forwards_resolved(context: &CompilerFrontend) -> Result<(), CompilerError> {
    let Some(forward) = context.types.first_unresolved_forward() else {
        return Ok(());
    };

    let ident = context.idents.get(forward);
    let location = ident
        .location
        .to_error_location(&context.modules.get(ident.module).path);

    return_rule_error!(
        format!(
            "Unresolved forward type declaration {}",
            context.name(ident.name)
        ),
        location,
        {
            PrimarySuggestion => "Declare the type in the same type group as the pointer to it",
        }
    )
}

/// constDecl = "const" (constDeclItem | "(" {constDeclItem ";"} ")")
pub fn parse_const_decl(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    token_stream.eat(&TokenKind::Const)?;
    parse_decl_group(token_stream, context, parse_const_decl_item)
}

/// constDeclItem = ident exportMark "=" expr
fn parse_const_decl_item(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    let declared = parse_declared_name(token_stream)?;
    token_stream.eat(&TokenKind::Assign)?;
    let (value, data_type) = parse_const_expression(token_stream, context)?;

    decl_log!("const ", {context.name(declared.name)}, " = ", {value.to_string()});

    let mut ident = context.new_ident(declared.name, IdentKind::Const, data_type, declared.location);
    ident.exported = declared.exported;
    ident.payload = IdentPayload::Const(value);
    context.declare(ident)?;
    Ok(())
}

/// varDecl = "var" (varDeclItem | "(" {varDeclItem ";"} ")")
pub fn parse_var_decl(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    token_stream.eat(&TokenKind::Var)?;
    parse_decl_group(token_stream, context, parse_var_decl_item)
}

/// varDeclItem = typedIdentList | ident ":" type "=" expr
fn parse_var_decl_item(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    let (names, var_type) = parse_typed_ident_list(token_stream, context, MAX_IDENTS)?;

    let mut variable = None;
    for declared in &names {
        variable = Some(context.declare_variable(
            declared.name,
            declared.exported,
            var_type,
            declared.location,
        )?);
    }

    if token_stream.current_token_kind() != &TokenKind::Assign {
        return Ok(());
    }

    if names.len() != 1 {
        return_rule_error!(
            "Unable to initialize multiple variables",
            token_stream.current_error_location(),
            {
                PrimarySuggestion => "Declare each initialized variable separately",
            }
        )
    }

    let Some(variable) = variable else {
        return_compiler_error!("Variable list was empty")
    };

    // Globals are initialized with constants, locals are assigned at run time
    let global_slot = match context.idents.get(variable).payload {
        IdentPayload::Global { slot } => Some(slot),
        IdentPayload::Local { offset } => {
            context.codegen.emit(Instruction::PushLocalPtr(offset));
            None
        }
        _ => return_compiler_error!("Variable without storage"),
    };

    token_stream.advance();
    parse_assignment(token_stream, context, var_type, global_slot)
}

/// shortVarDecl = ident exportMark ":=" expr
pub fn parse_short_var_decl(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    let declared = parse_declared_name(token_stream)?;
    token_stream.eat(&TokenKind::ColonAssign)?;
    parse_decl_assignment(token_stream, context, declared)
}

/// fnDecl = "fn" [rcvSignature] ident exportMark signature [block]
/// Without a block the function is a prototype, linked against the host registry later.
pub fn parse_fn_decl(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    if !context.blocks.is_global() {
        return_rule_error!(
            "Nested functions are not allowed",
            token_stream.current_error_location()
        )
    }

    token_stream.eat(&TokenKind::Fn)?;
    let mut signature = Signature::default();

    let receiver = if token_stream.current_token_kind() == &TokenKind::OpenParenthesis {
        Some(parse_receiver_signature(
            token_stream,
            context,
            &mut signature,
        )?)
    } else {
        None
    };

    let location = token_stream.current_location();
    let name = token_stream.check_ident()?;

    // Methods and fields share one namespace on the receiver's type
    if let Some(base) = receiver
        && context.types.find_field(base, name).is_some()
    {
        let owner = match context.types.get(base) {
            TypeKind::Interface { .. } => "Interface",
            _ => "Structure",
        };

        return_rule_error!(
            format!("{owner} already has field {}", context.name(name)),
            token_stream.current_error_location(),
            {
                PrimarySuggestion => "Rename the method or the field",
            }
        )
    }

    if let Some(base) = receiver
        && context
            .idents
            .find_method(context.blocks.module, base, name)
            .is_some()
    {
        return_rule_error!(
            format!("Duplicate method {}", context.name(name)),
            token_stream.current_error_location(),
            {
                PrimarySuggestion => "Rename one of the methods",
            }
        )
    }

    token_stream.advance();
    let exported = parse_export_mark(token_stream);
    parse_signature(token_stream, context, &mut signature)?;

    let fn_type = context.types.add(TypeKind::Function { signature });
    let entry = context.codegen.ip();
    let has_body = token_stream.current_token_kind() == &TokenKind::OpenCurly;

    let mut ident = context.new_ident(name, IdentKind::Function, fn_type, location);
    ident.exported = exported;
    ident.receiver = receiver;
    ident.payload = IdentPayload::Function {
        entry,
        prototype_slot: (!has_body).then_some(entry),
    };
    let function = context.declare(ident)?;

    decl_log!("fn ", {context.name(name)}, " at ", entry);

    if has_body {
        parse_function_block(token_stream, context, function)
    } else {
        // Reserved for the jump to the host function
        context.codegen.emit(Instruction::Nop);
        Ok(())
    }
}
