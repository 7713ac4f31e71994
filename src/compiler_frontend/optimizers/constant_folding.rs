//! Compile-time evaluation of constant expressions.
//!
//! Global initializers, array lengths, const declarations and default
//! parameter values are all folded here while parsing. Nothing is deferred:
//! either the operands are constants and a value comes out, or the
//! expression is not constant and the caller reports it.

use crate::compiler_frontend::tokenizer::tokens::TokenKind;
use std::fmt::Display;

/// A folded compile-time value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

impl ConstValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(value) => Some(*value),
            ConstValue::Char(value) => Some(*value as i64),
            _ => None,
        }
    }

    /// Integer constants are promoted when a real is expected
    pub fn to_real(&self) -> Option<ConstValue> {
        match self {
            ConstValue::Int(value) => Some(ConstValue::Real(*value as f64)),
            ConstValue::Real(_) => Some(self.to_owned()),
            _ => None,
        }
    }

    pub fn evaluate_unary(&self, op: UnaryOperator) -> Result<ConstValue, FoldError> {
        match (op, self) {
            (UnaryOperator::Negate, ConstValue::Int(value)) => value
                .checked_neg()
                .map(ConstValue::Int)
                .ok_or(FoldError::Overflow),
            (UnaryOperator::Negate, ConstValue::Real(value)) => Ok(ConstValue::Real(-value)),
            (UnaryOperator::Not, ConstValue::Bool(value)) => Ok(ConstValue::Bool(!value)),
            _ => Err(FoldError::Unsupported),
        }
    }

    // Operand types have already been checked for compatibility by the expression parser
    pub fn evaluate_operator(
        &self,
        rhs: &ConstValue,
        op: Operator,
    ) -> Result<ConstValue, FoldError> {
        let value = match (self, rhs) {
            (ConstValue::Int(lhs), ConstValue::Int(rhs)) => {
                let (lhs, rhs) = (*lhs, *rhs);
                match op {
                    Operator::Add => ConstValue::Int(lhs.checked_add(rhs).ok_or(FoldError::Overflow)?),
                    Operator::Subtract => {
                        ConstValue::Int(lhs.checked_sub(rhs).ok_or(FoldError::Overflow)?)
                    }
                    Operator::Multiply => {
                        ConstValue::Int(lhs.checked_mul(rhs).ok_or(FoldError::Overflow)?)
                    }
                    Operator::Divide | Operator::Modulus if rhs == 0 => {
                        return Err(FoldError::DivisionByZero);
                    }
                    Operator::Divide => ConstValue::Int(lhs.checked_div(rhs).ok_or(FoldError::Overflow)?),
                    Operator::Modulus => ConstValue::Int(lhs.checked_rem(rhs).ok_or(FoldError::Overflow)?),
                    _ => compare(op, lhs.partial_cmp(&rhs))?,
                }
            }

            (ConstValue::Real(lhs), ConstValue::Real(rhs)) => {
                let (lhs, rhs) = (*lhs, *rhs);
                match op {
                    Operator::Add => ConstValue::Real(lhs + rhs),
                    Operator::Subtract => ConstValue::Real(lhs - rhs),
                    Operator::Multiply => ConstValue::Real(lhs * rhs),
                    Operator::Divide if rhs == 0.0 => return Err(FoldError::DivisionByZero),
                    Operator::Divide => ConstValue::Real(lhs / rhs),
                    Operator::Modulus => return Err(FoldError::Unsupported),
                    _ => compare(op, lhs.partial_cmp(&rhs))?,
                }
            }

            // Mixed numbers fold as reals
            (ConstValue::Int(_), ConstValue::Real(_)) | (ConstValue::Real(_), ConstValue::Int(_)) => {
                let (Some(lhs), Some(rhs)) = (self.to_real(), rhs.to_real()) else {
                    return Err(FoldError::Unsupported);
                };
                return lhs.evaluate_operator(&rhs, op);
            }

            (ConstValue::Bool(lhs), ConstValue::Bool(rhs)) => match op {
                Operator::And => ConstValue::Bool(*lhs && *rhs),
                Operator::Or => ConstValue::Bool(*lhs || *rhs),
                Operator::Equal => ConstValue::Bool(lhs == rhs),
                Operator::NotEqual => ConstValue::Bool(lhs != rhs),
                _ => return Err(FoldError::Unsupported),
            },

            (ConstValue::Char(lhs), ConstValue::Char(rhs)) => compare(op, lhs.partial_cmp(rhs))?,

            (ConstValue::Str(lhs), ConstValue::Str(rhs)) => match op {
                Operator::Add => ConstValue::Str(format!("{lhs}{rhs}")),
                _ => compare(op, lhs.partial_cmp(rhs))?,
            },

            (ConstValue::Null, ConstValue::Null) => match op {
                Operator::Equal => ConstValue::Bool(true),
                Operator::NotEqual => ConstValue::Bool(false),
                _ => return Err(FoldError::Unsupported),
            },

            _ => return Err(FoldError::Unsupported),
        };

        Ok(value)
    }
}

fn compare(op: Operator, ordering: Option<std::cmp::Ordering>) -> Result<ConstValue, FoldError> {
    let Some(ordering) = ordering else {
        return Err(FoldError::Unsupported);
    };

    let result = match op {
        Operator::Equal => ordering.is_eq(),
        Operator::NotEqual => ordering.is_ne(),
        Operator::LessThan => ordering.is_lt(),
        Operator::LessThanOrEqual => ordering.is_le(),
        Operator::GreaterThan => ordering.is_gt(),
        Operator::GreaterThanOrEqual => ordering.is_ge(),
        _ => return Err(FoldError::Unsupported),
    };

    Ok(ConstValue::Bool(result))
}

impl Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::Int(value) => write!(f, "{value}"),
            ConstValue::Real(value) => write!(f, "{value:?}"),
            ConstValue::Bool(value) => write!(f, "{value}"),
            ConstValue::Char(value) => write!(f, "{value:?}"),
            ConstValue::Str(value) => write!(f, "{value:?}"),
            ConstValue::Null => write!(f, "null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldError {
    DivisionByZero,
    Overflow,
    Unsupported,
}

impl FoldError {
    pub fn to_str(self) -> &'static str {
        match self {
            FoldError::DivisionByZero => "Division by zero",
            FoldError::Overflow => "Constant overflow",
            FoldError::Unsupported => "Operator is not applicable to these constants",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    And,
    Or,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    pub fn from_token(kind: &TokenKind) -> Option<Operator> {
        let op = match kind {
            TokenKind::Add => Operator::Add,
            TokenKind::Subtract => Operator::Subtract,
            TokenKind::Multiply => Operator::Multiply,
            TokenKind::Divide => Operator::Divide,
            TokenKind::Modulus => Operator::Modulus,
            TokenKind::And => Operator::And,
            TokenKind::Or => Operator::Or,
            TokenKind::Equal => Operator::Equal,
            TokenKind::NotEqual => Operator::NotEqual,
            TokenKind::LessThan => Operator::LessThan,
            TokenKind::LessThanOrEqual => Operator::LessThanOrEqual,
            TokenKind::GreaterThan => Operator::GreaterThan,
            TokenKind::GreaterThanOrEqual => Operator::GreaterThanOrEqual,
            _ => return None,
        };

        Some(op)
    }

    /// Higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Equal
            | Operator::NotEqual
            | Operator::LessThan
            | Operator::LessThanOrEqual
            | Operator::GreaterThan
            | Operator::GreaterThanOrEqual => 3,
            Operator::Add | Operator::Subtract => 4,
            Operator::Multiply | Operator::Divide | Operator::Modulus => 5,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == 3
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulus => "%",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_folds() {
        let folded = ConstValue::Int(6)
            .evaluate_operator(&ConstValue::Int(4), Operator::Multiply)
            .expect("should fold");
        assert_eq!(folded, ConstValue::Int(24));
    }

    #[test]
    fn mixed_numbers_fold_as_reals() {
        let folded = ConstValue::Int(1)
            .evaluate_operator(&ConstValue::Real(0.5), Operator::Add)
            .expect("should fold");
        assert_eq!(folded, ConstValue::Real(1.5));
    }

    #[test]
    fn division_by_zero_is_reported() {
        let result = ConstValue::Int(1).evaluate_operator(&ConstValue::Int(0), Operator::Divide);
        assert_eq!(result, Err(FoldError::DivisionByZero));
    }

    #[test]
    fn overflow_is_reported() {
        let result = ConstValue::Int(i64::MAX).evaluate_operator(&ConstValue::Int(1), Operator::Add);
        assert_eq!(result, Err(FoldError::Overflow));
    }

    #[test]
    fn comparisons_produce_booleans() {
        let folded = ConstValue::Char('a')
            .evaluate_operator(&ConstValue::Char('b'), Operator::LessThan)
            .expect("should fold");
        assert_eq!(folded, ConstValue::Bool(true));
    }

    #[test]
    fn not_only_applies_to_booleans() {
        assert_eq!(
            ConstValue::Bool(false).evaluate_unary(UnaryOperator::Not),
            Ok(ConstValue::Bool(true))
        );
        assert_eq!(
            ConstValue::Int(1).evaluate_unary(UnaryOperator::Not),
            Err(FoldError::Unsupported)
        );
    }
}
