use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::datatypes::{Signature, TypeId, TypeKind};
use crate::compiler_frontend::parsers::expressions::{
    assert_compatible, convert_implicitly, parse_const_expression,
};
use crate::compiler_frontend::parsers::identifier_lists::parse_typed_ident_list;
use crate::compiler_frontend::parsers::type_grammar::parse_type;
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TokenKind};
use crate::settings::MAX_PARAMS;
use crate::return_rule_error;

/// rcvSignature = "(" ident ":" type ")"
/// The receiver becomes parameter 0. Returns the structured type it points at.
pub fn parse_receiver_signature(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    signature: &mut Signature,
) -> Result<TypeId, CompilerError> {
    token_stream.eat(&TokenKind::OpenParenthesis)?;
    let receiver_name = token_stream.eat_ident()?;
    token_stream.eat(&TokenKind::Colon)?;

    let location = token_stream.current_error_location();
    let receiver_type = parse_type(token_stream, context)?;

    let base = match context.types.get(receiver_type) {
        TypeKind::Pointer { base } if context.types.is_structured(*base) => *base,
        _ => return_rule_error!(
            "Receiver should be a pointer to a structured type",
            location,
            {
                PrimarySuggestion => "Use a pointer receiver such as (p: ^Point)",
            }
        ),
    };

    signature.is_method = true;
    context
        .types
        .add_param(signature, receiver_name, receiver_type, None);

    token_stream.eat(&TokenKind::CloseParenthesis)?;
    Ok(base)
}

/// signature = "(" [typedIdentList ["=" expr] {"," typedIdentList ["=" expr]}] ")" [":" type]
pub fn parse_signature(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    signature: &mut Signature,
) -> Result<(), CompilerError> {
    token_stream.eat(&TokenKind::OpenParenthesis)?;
    let mut num_default_params = 0;

    if let TokenKind::Ident(_) = token_stream.current_token_kind() {
        loop {
            let (names, param_type) = parse_typed_ident_list(token_stream, context, MAX_PARAMS)?;

            // ["=" expr]
            let mut default_value = None;
            if token_stream.current_token_kind() == &TokenKind::Assign {
                let location = token_stream.current_error_location();

                if names.len() != 1 {
                    return_rule_error!(
                        "Parameter list cannot have common default value",
                        location,
                        {
                            PrimarySuggestion => "Give the parameter with a default value its own group",
                        }
                    )
                }

                token_stream.advance();
                let location = token_stream.current_error_location();
                let (value, value_type) = parse_const_expression(token_stream, context)?;

                if context.types.is_structured(value_type) {
                    return_rule_error!("Structured default values are not allowed", location)
                }

                let (value, value_type) = convert_implicitly(context, param_type, value, value_type);
                assert_compatible(context, param_type, value_type, location)?;

                default_value = Some(value);
                num_default_params += 1;
            } else if num_default_params != 0 {
                return_rule_error!(
                    "Parameters with default values should be the last ones",
                    token_stream.current_error_location(),
                    {
                        PrimarySuggestion => "Move parameters with default values to the end of the list",
                    }
                )
            }

            for param in names {
                if param.exported {
                    return_rule_error!(
                        format!("Parameter {} cannot be exported", context.name(param.name)),
                        context.error_location(param.location)
                    )
                }

                let added = context.types.add_param(
                    signature,
                    param.name,
                    param_type,
                    default_value.to_owned(),
                );

                if added.is_none() {
                    return_rule_error!(
                        "Parameters are too large",
                        context.error_location(param.location)
                    )
                }
            }

            if token_stream.current_token_kind() != &TokenKind::Comma {
                break;
            }
            token_stream.advance();
        }
    }

    token_stream.eat(&TokenKind::CloseParenthesis)?;
    signature.num_default_params = num_default_params;

    // Result type
    let location = token_stream.current_error_location();
    let result_type = if token_stream.current_token_kind() == &TokenKind::Colon {
        token_stream.advance();
        parse_type(token_stream, context)?
    } else {
        TypeId::VOID
    };
    signature.results = vec![result_type];

    // Structured results are written through a pointer supplied by the caller
    if context.types.is_structured(result_type) {
        let result_pointer = context.types.add_pointer_to(result_type);
        let result_name = context.reserved.result_param;

        if context
            .types
            .add_param(signature, result_name, result_pointer, None)
            .is_none()
        {
            return_rule_error!("Parameters are too large", location)
        }
    }

    Ok(())
}
