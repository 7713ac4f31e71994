//! type = qualIdent | "^" type | "[" [expr] "]" type | "str" ["[" expr "]"]
//!      | "struct" "{" {typedIdentList ";"} "}"
//!      | "interface" "{" {ident signature ";"} "}"
//!      | "fn" signature

use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::{Signature, TypeId, TypeKind};
use crate::compiler_frontend::parsers::expressions::parse_const_expression;
use crate::compiler_frontend::parsers::identifier_lists::{parse_export_mark, parse_typed_ident_list};
use crate::compiler_frontend::parsers::signatures::parse_signature;
use crate::compiler_frontend::symbols::identifiers::{IdentId, IdentKind};
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TokenKind};
use crate::settings::MAX_FIELDS;
use crate::{return_rule_error, return_syntax_error, return_type_error, type_log};

pub fn parse_type(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<TypeId, CompilerError> {
    match token_stream.current_token_kind() {
        TokenKind::Ident(_) => {
            let location = token_stream.current_error_location();
            let ident = parse_type_ident(token_stream, context)?;
            let ident = context.idents.get(ident);

            // Its size isn't known until the declaration is reached
            if context.types.is_forward(ident.data_type) {
                return_rule_error!(
                    format!(
                        "Unresolved forward type {} can only be used through a pointer",
                        context.name(ident.name)
                    ),
                    location,
                    {
                        PrimarySuggestion => "Declare the type before embedding it by value",
                    }
                )
            }

            Ok(ident.data_type)
        }
        TokenKind::Caret => parse_pointer_type(token_stream, context),
        TokenKind::OpenBracket => parse_array_type(token_stream, context),
        TokenKind::Str => parse_str_type(token_stream, context),
        TokenKind::Struct => parse_struct_type(token_stream, context),
        TokenKind::Interface => parse_interface_type(token_stream, context),
        TokenKind::Fn => parse_fn_type(token_stream, context),

        found => return_syntax_error!(
            format!("Type expected but {} found", found.spelling()),
            token_stream.current_error_location(),
            {
                CompilationStage => "Type Parsing",
            }
        ),
    }
}

/// A (qualified) identifier that has to name a type
fn parse_type_ident(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<IdentId, CompilerError> {
    let location = token_stream.current_error_location();
    let id = parse_qualified_ident(token_stream, context)?;
    let ident = context.idents.get(id);

    if ident.kind != IdentKind::Type {
        return_rule_error!(
            format!(
                "Type expected but {} {} found",
                ident.kind.to_str(),
                context.name(ident.name)
            ),
            location
        )
    }

    Ok(id)
}

/// Whether the current identifier starts a `module.name` reference
fn names_module(token_stream: &FileTokens, context: &CompilerFrontend) -> bool {
    let TokenKind::Ident(name) = token_stream.current_token_kind() else {
        return false;
    };

    token_stream.peek_next_token() == Some(&TokenKind::Dot)
        && context.modules.find_by_name(*name).is_some()
}

/// qualIdent = [ident "."] ident
/// The module has to be imported by the current module
/// and the identifier has to be exported from it.
pub fn parse_qualified_ident(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<IdentId, CompilerError> {
    let mut location = token_stream.current_error_location();

    if names_module(token_stream, context) {
        let module_name = token_stream.eat_ident()?;
        token_stream.eat(&TokenKind::Dot)?;

        let Some(module) = context
            .modules
            .find_imported_by_name(context.blocks.module, module_name)
        else {
            return_rule_error!(format!("Unknown module {}", context.name(module_name)), location)
        };

        if !context.modules.imports(context.blocks.module, module) {
            return_rule_error!(
                format!("Module {} is not imported", context.name(module_name)),
                location,
                {
                    PrimarySuggestion => "Add the module to the import clause of this file",
                }
            )
        }

        location = token_stream.current_error_location();
        let name = token_stream.eat_ident()?;

        let Some(ident) = context.idents.find_in_module(module, name) else {
            return_rule_error!(
                format!(
                    "Unknown identifier {}.{}",
                    context.name(module_name),
                    context.name(name)
                ),
                location
            )
        };

        if !context.idents.get(ident).exported {
            return_rule_error!(
                format!(
                    "Identifier {}.{} is not exported",
                    context.name(module_name),
                    context.name(name)
                ),
                location,
                {
                    PrimarySuggestion => "Mark the declaration with '*' to export it",
                }
            )
        }

        return Ok(ident);
    }

    let name = token_stream.eat_ident()?;
    match context.idents.find(&context.blocks, name) {
        Some(ident) => Ok(ident),
        None => return_rule_error!(format!("Unknown identifier {}", context.name(name)), location),
    }
}

/// ptrType = "^" type
/// A pointer to a name that isn't declared yet binds a forward placeholder to that name
fn parse_pointer_type(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<TypeId, CompilerError> {
    token_stream.eat(&TokenKind::Caret)?;

    if let TokenKind::Ident(name) = *token_stream.current_token_kind()
        && !names_module(token_stream, context)
        && context.idents.find(&context.blocks, name).is_none()
    {
        let location = token_stream.current_location();
        token_stream.advance();
        let exported = parse_export_mark(token_stream);

        let forward = context.types.add(TypeKind::Forward {
            ident: IdentId::PENDING,
        });
        let ident = context.declare_type(name, exported, forward, location)?;
        context.types.bind_forward(forward, ident);

        type_log!("Forward declared type ", {context.name(name)});
        return Ok(context.types.add_pointer_to(forward));
    }

    // A pointer may refer to a type whose declaration is still ahead
    if let TokenKind::Ident(_) = token_stream.current_token_kind() {
        let ident = parse_type_ident(token_stream, context)?;
        let base = context.idents.get(ident).data_type;
        return Ok(context.types.add_pointer_to(base));
    }

    let base = parse_type(token_stream, context)?;
    Ok(context.types.add_pointer_to(base))
}

/// Array lengths and string capacities are non-negative integer constants
fn parse_length(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    negative_msg: &'static str,
) -> Result<i64, CompilerError> {
    let location = token_stream.current_error_location();
    let (value, value_type) = parse_const_expression(token_stream, context)?;

    if !context.types.compatible(TypeId::INT, value_type) {
        return_type_error!(
            format!("Incompatible types int and {}", context.type_name(value_type)),
            location,
            {
                ExpectedType => "int",
            }
        )
    }

    match value.as_int() {
        Some(length) if length >= 0 => Ok(length),
        _ => return_rule_error!(negative_msg, location),
    }
}

/// arrayType = "[" [expr] "]" type
fn parse_array_type(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<TypeId, CompilerError> {
    let location = token_stream.current_error_location();
    token_stream.eat(&TokenKind::OpenBracket)?;

    let length = if token_stream.current_token_kind() == &TokenKind::CloseBracket {
        -1
    } else {
        parse_length(token_stream, context, "Array length cannot be negative")?
    };

    token_stream.eat(&TokenKind::CloseBracket)?;
    let base = parse_type(token_stream, context)?;

    let array_type = context.types.add(TypeKind::Array { base, length });
    if context.types.size_of(array_type).is_none() {
        return_rule_error!("Type is too large", location)
    }

    Ok(array_type)
}

/// strType = "str" ["[" expr "]"]
fn parse_str_type(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<TypeId, CompilerError> {
    let location = token_stream.current_error_location();
    token_stream.eat(&TokenKind::Str)?;

    let capacity = if token_stream.current_token_kind() == &TokenKind::OpenBracket {
        token_stream.advance();
        let capacity = parse_length(token_stream, context, "String length cannot be negative")?;
        token_stream.eat(&TokenKind::CloseBracket)?;
        capacity
    } else {
        // Room for the terminator
        match context.config.default_str_len.checked_add(1) {
            Some(capacity) => capacity,
            None => return_rule_error!("Type is too large", location),
        }
    };

    Ok(context.types.add(TypeKind::BoundedString { capacity }))
}

/// structType = "struct" "{" {typedIdentList ";"} "}"
fn parse_struct_type(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<TypeId, CompilerError> {
    token_stream.eat(&TokenKind::Struct)?;
    token_stream.eat(&TokenKind::OpenCurly)?;

    let struct_type = context.types.add(TypeKind::Struct { fields: Vec::new() });

    while let TokenKind::Ident(_) = token_stream.current_token_kind() {
        let (names, field_type) = parse_typed_ident_list(token_stream, context, MAX_FIELDS)?;

        for field in names {
            let location = context.error_location(field.location);

            if field.exported {
                return_rule_error!(
                    format!("Field {} cannot be exported", context.name(field.name)),
                    location,
                    {
                        PrimarySuggestion => "Export the struct type instead of its fields",
                    }
                )
            }

            if context.types.find_field(struct_type, field.name).is_some() {
                return_rule_error!(
                    format!("Duplicate field {}", context.name(field.name)),
                    location
                )
            }

            if context.types.add_field(struct_type, field.name, field_type).is_none() {
                return_rule_error!("Type is too large", location)
            }
        }

        token_stream.eat_separator(&TokenKind::CloseCurly)?;
    }

    token_stream.eat(&TokenKind::CloseCurly)?;
    Ok(struct_type)
}

/// interfaceType = "interface" "{" {ident signature ";"} "}"
/// Field 0 is the hidden self pointer.
/// Each method gets self as its first parameter and remembers its own field offset.
fn parse_interface_type(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<TypeId, CompilerError> {
    token_stream.eat(&TokenKind::Interface)?;
    token_stream.eat(&TokenKind::OpenCurly)?;

    let interface_type = context.types.add(TypeKind::Interface { fields: Vec::new() });
    let self_name = context.reserved.self_param;
    context
        .types
        .add_field(interface_type, self_name, TypeId::PTR_VOID);

    while let TokenKind::Ident(method_name) = *token_stream.current_token_kind() {
        let location = token_stream.current_error_location();
        token_stream.advance();

        if context.types.find_field(interface_type, method_name).is_some() {
            return_rule_error!(
                format!("Duplicate field {}", context.name(method_name)),
                location
            )
        }

        let mut signature = Signature::default();
        context
            .types
            .add_param(&mut signature, self_name, TypeId::PTR_VOID, None);
        parse_signature(token_stream, context, &mut signature)?;

        let Some(offset) = context.types.size_of(interface_type) else {
            return_rule_error!("Type is too large", location)
        };
        signature.is_method = true;
        signature.offset_from_self = offset;

        let method_type = context.types.add(TypeKind::Function { signature });
        if context
            .types
            .add_field(interface_type, method_name, method_type)
            .is_none()
        {
            return_rule_error!("Type is too large", location)
        }

        token_stream.eat_separator(&TokenKind::CloseCurly)?;
    }

    token_stream.eat(&TokenKind::CloseCurly)?;
    Ok(interface_type)
}

/// fnType = "fn" signature
fn parse_fn_type(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<TypeId, CompilerError> {
    token_stream.eat(&TokenKind::Fn)?;

    let mut signature = Signature::default();
    parse_signature(token_stream, context, &mut signature)?;

    Ok(context.types.add(TypeKind::Function { signature }))
}
