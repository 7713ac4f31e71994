//! Expressions, only as far as declarations need them.
//!
//! expr    = unary {binOp unary}   (precedence climbing)
//! unary   = ["-" | "!"] unary | primary
//! primary = literal | qualIdent | "(" expr ")"
//!
//! In constant mode everything folds to a value and nothing is emitted.
//! In runtime mode code is emitted that leaves the value on the stack.

use crate::compiler_frontend::CompilerFrontend;
use crate::compiler_frontend::codegen::instructions::Instruction;
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorLocation};
use crate::compiler_frontend::datatypes::{TypeId, TypeKind};
use crate::compiler_frontend::optimizers::constant_folding::{
    ConstValue, Operator, UnaryOperator,
};
use crate::compiler_frontend::parsers::type_grammar::parse_qualified_ident;
use crate::compiler_frontend::symbols::identifiers::{IdentKind, IdentPayload};
use crate::compiler_frontend::tokenizer::tokens::{FileTokens, TokenKind};
use crate::{return_compiler_error, return_rule_error, return_syntax_error, return_type_error};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalMode {
    Constant,
    Runtime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue {
    pub data_type: TypeId,

    /// Always set in constant mode.
    /// In runtime mode only set for a bare literal or named constant.
    pub constant: Option<ConstValue>,
}

pub fn parse_expression(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    mode: EvalMode,
) -> Result<TypedValue, CompilerError> {
    parse_binary(token_stream, context, mode, 1)
}

/// Evaluates an expression at compile time
pub fn parse_const_expression(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
) -> Result<(ConstValue, TypeId), CompilerError> {
    let value = parse_expression(token_stream, context, EvalMode::Constant)?;

    match value.constant {
        Some(constant) => Ok((constant, value.data_type)),
        None => return_compiler_error!("Constant expression produced no value"),
    }
}

/// Integer constants become reals when a real is expected
pub fn convert_implicitly(
    context: &CompilerFrontend,
    target: TypeId,
    value: ConstValue,
    value_type: TypeId,
) -> (ConstValue, TypeId) {
    if context.types.is_real(target)
        && context.types.is_integer(value_type)
        && let Some(real) = value.to_real()
    {
        return (real, target);
    }

    (value, value_type)
}

/// Same conversion for a value already on the stack
pub fn convert_on_stack(context: &mut CompilerFrontend, target: TypeId, value_type: TypeId) -> TypeId {
    if context.types.is_real(target) && context.types.is_integer(value_type) {
        context.codegen.emit(Instruction::Convert {
            from: value_type,
            to: target,
        });
        return target;
    }

    value_type
}

pub fn assert_compatible(
    context: &CompilerFrontend,
    target: TypeId,
    found: TypeId,
    location: ErrorLocation,
) -> Result<(), CompilerError> {
    if !context.types.compatible(target, found) {
        return_type_error!(
            format!(
                "Incompatible types {} and {}",
                context.type_name(target),
                context.type_name(found)
            ),
            location
        )
    }

    Ok(())
}

fn convert_value(
    context: &mut CompilerFrontend,
    mode: EvalMode,
    target: TypeId,
    value: TypedValue,
) -> TypedValue {
    if !(context.types.is_real(target) && context.types.is_integer(value.data_type)) {
        return value;
    }

    if mode == EvalMode::Runtime {
        convert_on_stack(context, target, value.data_type);
    }

    TypedValue {
        data_type: target,
        constant: value.constant.and_then(|constant| constant.to_real()),
    }
}

fn parse_binary(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    mode: EvalMode,
    min_precedence: u8,
) -> Result<TypedValue, CompilerError> {
    let mut lhs = parse_unary(token_stream, context, mode)?;

    while let Some(op) = Operator::from_token(token_stream.current_token_kind()) {
        if op.precedence() < min_precedence {
            break;
        }

        let location = token_stream.current_error_location();
        token_stream.advance();

        let rhs = parse_binary(token_stream, context, mode, op.precedence() + 1)?;
        lhs = apply_binary(context, mode, lhs, rhs, op, location)?;
    }

    Ok(lhs)
}

fn operator_applies(context: &CompilerFrontend, op: Operator, data_type: TypeId) -> bool {
    let types = &context.types;
    let is_string = matches!(types.get(data_type), TypeKind::BoundedString { .. });

    match op {
        Operator::Add => types.is_numeric(data_type) || is_string,
        Operator::Subtract | Operator::Multiply | Operator::Divide => types.is_numeric(data_type),
        Operator::Modulus => types.is_integer(data_type),
        Operator::And | Operator::Or => data_type == TypeId::BOOL,
        Operator::Equal | Operator::NotEqual => {
            types.is_ordinal(data_type)
                || types.is_real(data_type)
                || types.is_pointer(data_type)
                || is_string
        }
        Operator::LessThan
        | Operator::LessThanOrEqual
        | Operator::GreaterThan
        | Operator::GreaterThanOrEqual => {
            types.is_numeric(data_type) || data_type == TypeId::CHAR || is_string
        }
    }
}

fn apply_binary(
    context: &mut CompilerFrontend,
    mode: EvalMode,
    lhs: TypedValue,
    rhs: TypedValue,
    op: Operator,
    location: ErrorLocation,
) -> Result<TypedValue, CompilerError> {
    let rhs = convert_value(context, mode, lhs.data_type, rhs);
    assert_compatible(context, lhs.data_type, rhs.data_type, location.to_owned())?;

    if !operator_applies(context, op, lhs.data_type) {
        return_type_error!(
            format!(
                "Operator {} is not applicable to {}",
                op.to_str(),
                context.type_name(lhs.data_type)
            ),
            location
        )
    }

    if matches!(op, Operator::Divide | Operator::Modulus)
        && matches!(rhs.constant, Some(ConstValue::Int(0)))
    {
        return_rule_error!("Division by zero", location)
    }

    let data_type = if op.is_comparison() {
        TypeId::BOOL
    } else {
        lhs.data_type
    };

    match mode {
        EvalMode::Constant => {
            let (Some(left), Some(right)) = (lhs.constant, rhs.constant) else {
                return_compiler_error!("Constant operands expected for {}", op.to_str())
            };

            match left.evaluate_operator(&right, op) {
                Ok(constant) => Ok(TypedValue {
                    data_type,
                    constant: Some(constant),
                }),
                Err(e) => return_rule_error!(e.to_str(), location),
            }
        }
        EvalMode::Runtime => {
            context.codegen.emit(Instruction::Binary(op));
            Ok(TypedValue {
                data_type,
                constant: None,
            })
        }
    }
}

fn parse_unary(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    mode: EvalMode,
) -> Result<TypedValue, CompilerError> {
    let op = match token_stream.current_token_kind() {
        TokenKind::Subtract => UnaryOperator::Negate,
        TokenKind::Not => UnaryOperator::Not,
        _ => return parse_primary(token_stream, context, mode),
    };

    let location = token_stream.current_error_location();
    token_stream.advance();
    let operand = parse_unary(token_stream, context, mode)?;

    let applies = match op {
        UnaryOperator::Negate => context.types.is_numeric(operand.data_type),
        UnaryOperator::Not => operand.data_type == TypeId::BOOL,
    };

    if !applies {
        return_type_error!(
            format!(
                "Operator {} is not applicable to {}",
                if op == UnaryOperator::Negate { "-" } else { "!" },
                context.type_name(operand.data_type)
            ),
            location
        )
    }

    match mode {
        EvalMode::Constant => {
            let Some(constant) = operand.constant else {
                return_compiler_error!("Constant operand expected")
            };

            match constant.evaluate_unary(op) {
                Ok(constant) => Ok(TypedValue {
                    data_type: operand.data_type,
                    constant: Some(constant),
                }),
                Err(e) => return_rule_error!(e.to_str(), location),
            }
        }
        EvalMode::Runtime => {
            context.codegen.emit(Instruction::Unary(op));
            Ok(TypedValue {
                data_type: operand.data_type,
                constant: None,
            })
        }
    }
}

fn push_constant(
    context: &mut CompilerFrontend,
    mode: EvalMode,
    constant: ConstValue,
    data_type: TypeId,
) -> TypedValue {
    if mode == EvalMode::Runtime {
        context.codegen.emit(Instruction::PushConst(constant.to_owned()));
    }

    TypedValue {
        data_type,
        constant: Some(constant),
    }
}

fn parse_primary(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    mode: EvalMode,
) -> Result<TypedValue, CompilerError> {
    let (constant, data_type) = match token_stream.current_token_kind() {
        TokenKind::IntLiteral(value) => (ConstValue::Int(*value), TypeId::INT),
        TokenKind::RealLiteral(value) => (ConstValue::Real(*value), TypeId::REAL),
        TokenKind::CharLiteral(value) => (ConstValue::Char(*value), TypeId::CHAR),
        TokenKind::StringLiteral(value) => {
            let value = ConstValue::Str(context.name(*value).to_owned());
            let capacity = context.config.default_str_len + 1;
            (value, context.types.add(TypeKind::BoundedString { capacity }))
        }

        TokenKind::OpenParenthesis => {
            token_stream.advance();
            let value = parse_expression(token_stream, context, mode)?;
            token_stream.eat(&TokenKind::CloseParenthesis)?;
            return Ok(value);
        }

        TokenKind::Ident(_) => return parse_ident_operand(token_stream, context, mode),

        found => return_syntax_error!(
            format!("Expression expected but {} found", found.spelling()),
            token_stream.current_error_location(),
            {
                CompilationStage => "Expression Parsing",
            }
        ),
    };

    token_stream.advance();
    Ok(push_constant(context, mode, constant, data_type))
}

fn parse_ident_operand(
    token_stream: &mut FileTokens,
    context: &mut CompilerFrontend,
    mode: EvalMode,
) -> Result<TypedValue, CompilerError> {
    let location = token_stream.current_error_location();
    let ident = parse_qualified_ident(token_stream, context)?;
    let ident = context.idents.get(ident).to_owned();

    match (ident.kind, ident.payload) {
        (IdentKind::Const, IdentPayload::Const(constant)) => {
            Ok(push_constant(context, mode, constant, ident.data_type))
        }

        // A function's value is its entry address
        (IdentKind::Function, IdentPayload::Function { entry, .. }) => Ok(push_constant(
            context,
            mode,
            ConstValue::Int(entry as i64),
            ident.data_type,
        )),

        (IdentKind::Variable, _) if mode == EvalMode::Constant => return_rule_error!(
            format!("Constant expected but variable {} found", context.name(ident.name)),
            location,
            {
                PrimarySuggestion => "Only constants can be used here, global initializers are evaluated at compile time",
            }
        ),

        (IdentKind::Variable, IdentPayload::Global { slot }) => {
            context.codegen.emit(Instruction::PushGlobalPtr(slot));
            context.codegen.emit(Instruction::Deref(ident.data_type));
            Ok(TypedValue {
                data_type: ident.data_type,
                constant: None,
            })
        }

        (IdentKind::Variable, IdentPayload::Local { offset }) => {
            context.codegen.emit(Instruction::PushLocalPtr(offset));
            context.codegen.emit(Instruction::Deref(ident.data_type));
            Ok(TypedValue {
                data_type: ident.data_type,
                constant: None,
            })
        }

        (IdentKind::Type, _) => return_rule_error!(
            format!("Expression expected but type {} found", context.name(ident.name)),
            location
        ),

        (kind, _) => return_compiler_error!(
            "Identifier {} of kind {} has a mismatched payload",
            context.name(ident.name),
            kind.to_str()
        ),
    }
}
