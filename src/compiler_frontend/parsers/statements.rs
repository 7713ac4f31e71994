//! block = "{" stmt {";" stmt} "}"
//! stmt  = typeDecl | constDecl | varDecl | shortVarDecl | fnDecl
//!       | assignment | "return" [expr] | block

use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::codegen::instructions::Instruction;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::TypeId;
use crate::compiler_frontend::parsers::declarations::{
    parse_const_decl, parse_fn_decl, parse_short_var_decl, parse_type_decl, parse_var_decl,
};
use crate::compiler_frontend::parsers::expressions::{
    EvalMode, assert_compatible, convert_implicitly, convert_on_stack, parse_const_expression,
    parse_expression,
};
use crate::compiler_frontend::parsers::identifier_lists::DeclaredName;
use crate::compiler_frontend::parsers::type_grammar::parse_qualified_ident;
use crate::compiler_frontend::symbols::identifiers::{IdentId, IdentKind, IdentPayload};
use crate::compiler_frontend::symbols::modules::ROOT_MODULE;
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TokenKind};
use crate::{decl_log, return_compiler_error, return_rule_error, return_syntax_error};

/// A nested block with its own scope
pub fn parse_block(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    context.blocks.enter(None);
    parse_block_body(token_stream, context)?;
    context.blocks.leave();
    Ok(())
}

fn parse_block_body(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    token_stream.eat(&TokenKind::OpenCurly)?;

    loop {
        parse_statement(token_stream, context)?;

        if token_stream.current_token_kind() != &TokenKind::Semicolon {
            break;
        }
        token_stream.advance();
    }

    token_stream.eat(&TokenKind::CloseCurly)
}

fn parse_statement(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    match token_stream.current_token_kind() {
        // Empty statement
        TokenKind::Semicolon | TokenKind::CloseCurly => Ok(()),

        TokenKind::Type => parse_type_decl(token_stream, context),
        TokenKind::Const => parse_const_decl(token_stream, context),
        TokenKind::Var => parse_var_decl(token_stream, context),
        TokenKind::Fn => parse_fn_decl(token_stream, context),
        TokenKind::OpenCurly => parse_block(token_stream, context),
        TokenKind::Return => parse_return(token_stream, context),

        TokenKind::Ident(_) => match token_stream.peek_next_token() {
            Some(TokenKind::ColonAssign) | Some(TokenKind::Multiply) => {
                parse_short_var_decl(token_stream, context)
            }
            _ => parse_assignment_statement(token_stream, context),
        },

        found => return_syntax_error!(
            format!("Statement expected but {} found", found.spelling()),
            token_stream.current_error_location(),
            {
                CompilationStage => "Statement Parsing",
            }
        ),
    }
}

/// designator "=" expr
fn parse_assignment_statement(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    let location = token_stream.current_error_location();
    let ident = parse_qualified_ident(token_stream, context)?;
    let ident = context.idents.get(ident);

    let pointer = match (ident.kind, &ident.payload) {
        (IdentKind::Variable, IdentPayload::Global { slot }) => Instruction::PushGlobalPtr(*slot),
        (IdentKind::Variable, IdentPayload::Local { offset }) => Instruction::PushLocalPtr(*offset),
        (kind, _) => return_rule_error!(
            format!(
                "Variable expected but {} {} found",
                kind.to_str(),
                context.name(ident.name)
            ),
            location
        ),
    };

    let target_type = ident.data_type;
    context.codegen.emit(pointer);

    token_stream.eat(&TokenKind::Assign)?;
    parse_assignment(token_stream, context, target_type, None)
}

/// Assigns the expression to a variable.
/// At module scope the value is folded and stored straight into the global slot.
/// Otherwise the variable's address is already on the stack and an assignment is emitted.
pub fn parse_assignment(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    target_type: TypeId,
    global_slot: Option<usize>,
) -> Result<(), CompilerError> {
    let location = token_stream.current_error_location();

    match global_slot {
        Some(slot) => {
            let (value, value_type) = parse_const_expression(token_stream, context)?;
            let (value, value_type) = convert_implicitly(context, target_type, value, value_type);
            assert_compatible(context, target_type, value_type, location)?;

            let Some(global) = context.globals.get_mut(slot) else {
                return_compiler_error!("Global slot {} was never allocated", slot)
            };
            global.value = Some(value);
        }
        None => {
            let value = parse_expression(token_stream, context, EvalMode::Runtime)?;
            let value_type = convert_on_stack(context, target_type, value.data_type);
            assert_compatible(context, target_type, value_type, location)?;

            context.codegen.emit(Instruction::Assign(target_type));
        }
    }

    Ok(())
}

/// The variable takes the type of its initializer.
/// The initializer is evaluated before the variable exists, so it can't refer to itself.
pub fn parse_decl_assignment(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    declared: DeclaredName,
) -> Result<(), CompilerError> {
    let location = token_stream.current_error_location();

    let (value, data_type) = if context.blocks.is_global() {
        let (value, data_type) = parse_const_expression(token_stream, context)?;
        (Some(value), data_type)
    } else {
        let value = parse_expression(token_stream, context, EvalMode::Runtime)?;
        (None, value.data_type)
    };

    if data_type == TypeId::VOID || data_type == TypeId::NULL {
        return_rule_error!(
            format!(
                "Type of {} cannot be inferred from {}",
                context.name(declared.name),
                context.type_name(data_type)
            ),
            location,
            {
                PrimarySuggestion => "Declare the variable with an explicit type",
            }
        )
    }

    let variable =
        context.declare_variable(declared.name, declared.exported, data_type, declared.location)?;

    match (&context.idents.get(variable).payload, value) {
        (IdentPayload::Global { slot }, Some(value)) => {
            let slot = *slot;
            if let Some(global) = context.globals.get_mut(slot) {
                global.value = Some(value);
            }
        }
        (IdentPayload::Local { offset }, None) => {
            let offset = *offset;
            context.codegen.emit(Instruction::PushLocalPtr(offset));
            context.codegen.emit(Instruction::SwapAssign(data_type));
        }
        _ => return_compiler_error!("Variable storage doesn't match the current scope"),
    }

    Ok(())
}

/// "return" [expr]
fn parse_return(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(), CompilerError> {
    let location = token_stream.current_error_location();
    token_stream.eat(&TokenKind::Return)?;

    let Some(function) = context.blocks.current_function() else {
        return_compiler_error!("Return statement outside of a function body")
    };

    let Some(signature) = context
        .types
        .signature(context.idents.get(function).data_type)
        .cloned()
    else {
        return_compiler_error!("Function identifier without a function type")
    };

    let result_type = signature.result().unwrap_or(TypeId::VOID);
    let has_value = !matches!(
        token_stream.current_token_kind(),
        TokenKind::Semicolon | TokenKind::CloseCurly
    );

    match (has_value, result_type == TypeId::VOID) {
        (false, true) => {}
        (false, false) => return_rule_error!(
            format!("Function must return {}", context.type_name(result_type)),
            location
        ),
        (true, true) => return_rule_error!("Function does not return a value", location),
        (true, false) => {
            // Structured results are copied into the caller's storage
            let result_param = signature
                .params
                .last()
                .filter(|param| param.name == context.reserved.result_param);

            if let Some(param) = result_param {
                context.codegen.emit(Instruction::PushLocalPtr(param.offset));
                context.codegen.emit(Instruction::Deref(param.data_type));
            }

            let value_location = token_stream.current_error_location();
            let value = parse_expression(token_stream, context, EvalMode::Runtime)?;
            let value_type = convert_on_stack(context, result_type, value.data_type);
            assert_compatible(context, result_type, value_type, value_location)?;

            if result_param.is_some() {
                context.codegen.emit(Instruction::Assign(result_type));
            }
        }
    }

    context.codegen.emit(Instruction::Return {
        params_size: signature.params_size,
    });

    Ok(())
}

/// Parameters become the first locals of the function frame.
/// A body for the entry function also patches the entry stub to jump here.
pub fn parse_function_block(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    function: IdentId,
) -> Result<(), CompilerError> {
    let ident = context.idents.get(function).to_owned();

    let Some(signature) = context.types.signature(ident.data_type).cloned() else {
        return_compiler_error!("Function identifier without a function type")
    };

    if ident.name == context.reserved.entry_function
        && ident.receiver.is_none()
        && context.blocks.module == ROOT_MODULE
    {
        if !signature.params.is_empty() || signature.result() != Some(TypeId::VOID) {
            return_rule_error!(
                format!("Illegal {}() signature", context.config.entry_function),
                context.error_location(ident.location),
                {
                    PrimarySuggestion => "The entry function takes no parameters and returns nothing",
                }
            )
        }

        let entry = context.codegen.ip();
        if !context.codegen.patch(0, Instruction::Goto(entry)) {
            return_compiler_error!("Entry stub was not emitted before the entry function");
        }
        context.codegen.main_defined = true;
    }

    decl_log!("Function body of ", {context.name(ident.name)});

    let enclosing_function = context.debug.function.replace(ident.name);
    context.blocks.enter(Some(function));

    for param in &signature.params {
        context.declare_variable(param.name, false, param.data_type, ident.location)?;
    }

    parse_block_body(token_stream, context)?;

    context.codegen.emit(Instruction::Return {
        params_size: signature.params_size,
    });

    context.blocks.leave();
    context.debug.function = enclosing_function;
    Ok(())
}
