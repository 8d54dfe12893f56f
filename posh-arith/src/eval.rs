//! Evaluation of the expression

use crate::ast::Ast;
use crate::ast::BinaryOperator;
use crate::ast::PostfixOperator;
use crate::ast::PrefixOperator;
use crate::env::Env;
use crate::token::Term;
use crate::token::Value;
use std::ops::Range;

/// Cause of an evaluation error
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EvalError<E> {
    /// A variable value that is not a valid number
    InvalidVariableValue(String),
    /// Division by zero
    DivisionByZero,
    /// Left bit-shifting of a negative value
    LeftShiftingNegative,
    /// Bit-shifting with a negative right-hand-side operand
    ReverseShifting,
    /// Assignment with a left-hand-side operand not being a variable
    AssignmentToValue,
    /// Error assigning a variable value.
    AssignVariableError(E),
}

/// Description of an error that occurred during evaluation
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error<E> {
    /// Cause of the error
    pub cause: EvalError<E>,
    /// Range of the substring in the evaluated expression string where the error occurred
    pub location: Range<usize>,
}

/// Expands a variable to its value.
fn expand_variable<E: Env>(
    name: &str,
    location: &Range<usize>,
    env: &E,
) -> Result<Value, Error<E::AssignVariableError>> {
    if let Some(value) = env.get_variable(name) {
        // TODO Parse non-decimal integer and float
        match value.parse() {
            Ok(number) => Ok(Value::Integer(number)),
            Err(_) => Err(Error {
                cause: EvalError::InvalidVariableValue(value.to_string()),
                location: location.clone(),
            }),
        }
    } else {
        Ok(Value::Integer(0))
    }
}

/// Evaluates a term into a value.
pub(crate) fn into_value<E: Env>(
    term: Term,
    env: &E,
) -> Result<Value, Error<E::AssignVariableError>> {
    match term {
        Term::Value(value) => Ok(value),
        Term::Variable { name, location } => expand_variable(name, &location, env),
    }
}

/// Tests if a term is a variable.
///
/// If the term is a value, returns an `AssignmentToValue` error with the given
/// location.
fn require_variable<'a, E>(
    term: Term<'a>,
    op_location: &Range<usize>,
) -> Result<(&'a str, Range<usize>), Error<E>> {
    match term {
        Term::Variable { name, location } => Ok((name, location)),
        Term::Value(_) => Err(Error {
            cause: EvalError::AssignmentToValue,
            location: op_location.clone(),
        }),
    }
}

/// Assigns a value to a variable and returns the value.
fn assign<E: Env>(
    name: &str,
    value: Value,
    location: Range<usize>,
    env: &mut E,
) -> Result<Value, Error<E::AssignVariableError>> {
    match env.assign_variable(name, value.to_string(), location.clone()) {
        Ok(()) => Ok(value),
        Err(e) => Err(Error {
            cause: EvalError::AssignVariableError(e),
            location,
        }),
    }
}

/// Applies a prefix operator to a term.
///
/// Arithmetic overflows wrap around in two's complement; only division and
/// remainder by zero are fatal.
fn apply_prefix<'a, E: Env>(
    term: Term<'a>,
    operator: PrefixOperator,
    op_location: &Range<usize>,
    env: &mut E,
) -> Result<Value, Error<E::AssignVariableError>> {
    match operator {
        PrefixOperator::Increment => {
            let (name, location) = require_variable(term, op_location)?;
            match expand_variable(name, &location, env)? {
                Value::Integer(value) => {
                    let new_value = Value::Integer(value.wrapping_add(1));
                    assign(name, new_value, location, env)
                }
            }
        }
        PrefixOperator::Decrement => {
            let (name, location) = require_variable(term, op_location)?;
            match expand_variable(name, &location, env)? {
                Value::Integer(value) => {
                    let new_value = Value::Integer(value.wrapping_sub(1));
                    assign(name, new_value, location, env)
                }
            }
        }
        PrefixOperator::NumericCoercion => into_value(term, env),
        PrefixOperator::NumericNegation => match into_value(term, env)? {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
        },
        PrefixOperator::LogicalNegation => match into_value(term, env)? {
            Value::Integer(value) => Ok(Value::Integer((value == 0) as _)),
        },
        PrefixOperator::BitwiseNegation => match into_value(term, env)? {
            Value::Integer(value) => Ok(Value::Integer(!value)),
        },
    }
}

/// Applies a postfix operator to a term.
fn apply_postfix<'a, E: Env>(
    term: Term<'a>,
    operator: PostfixOperator,
    op_location: &Range<usize>,
    env: &mut E,
) -> Result<Value, Error<E::AssignVariableError>> {
    let (name, location) = require_variable(term, op_location)?;
    match expand_variable(name, &location, env)? {
        old_value @ Value::Integer(value) => {
            let result = match operator {
                PostfixOperator::Increment => value.wrapping_add(1),
                PostfixOperator::Decrement => value.wrapping_sub(1),
            };
            let new_value = Value::Integer(result);
            assign(name, new_value, location, env)?;
            Ok(old_value)
        }
    }
}

/// Computes the result value of a binary operator.
///
/// If `operator` is a compound assignment operator, this function only computes
/// the result value without performing assignment.
fn binary_result<E>(
    lhs: Value,
    rhs: Value,
    operator: BinaryOperator,
    op_location: &Range<usize>,
) -> Result<Value, Error<E>> {
    fn require_non_negative<E>(v: i64, location: &Range<usize>) -> Result<u32, Error<E>> {
        u32::try_from(v).map_err(|_| Error {
            cause: EvalError::ReverseShifting,
            location: location.clone(),
        })
    }
    fn require_non_zero<E>(v: i64, location: &Range<usize>) -> Result<(), Error<E>> {
        if v != 0 {
            Ok(())
        } else {
            Err(Error {
                cause: EvalError::DivisionByZero,
                location: location.clone(),
            })
        }
    }

    let Value::Integer(lhs) = lhs;
    let Value::Integer(rhs) = rhs;
    use BinaryOperator::*;
    let result = match operator {
        LogicalOr => (lhs != 0 || rhs != 0) as _,
        LogicalAnd => (lhs != 0 && rhs != 0) as _,
        BitwiseOr | BitwiseOrAssign => lhs | rhs,
        BitwiseXor | BitwiseXorAssign => lhs ^ rhs,
        BitwiseAnd | BitwiseAndAssign => lhs & rhs,
        EqualTo => (lhs == rhs) as _,
        NotEqualTo => (lhs != rhs) as _,
        LessThan => (lhs < rhs) as _,
        GreaterThan => (lhs > rhs) as _,
        LessThanOrEqualTo => (lhs <= rhs) as _,
        GreaterThanOrEqualTo => (lhs >= rhs) as _,
        ShiftLeft | ShiftLeftAssign => {
            if lhs < 0 {
                return Err(Error {
                    cause: EvalError::LeftShiftingNegative,
                    location: op_location.clone(),
                });
            }
            let rhs = require_non_negative(rhs, op_location)?;
            lhs.wrapping_shl(rhs)
        }
        ShiftRight | ShiftRightAssign => {
            let rhs = require_non_negative(rhs, op_location)?;
            lhs.wrapping_shr(rhs)
        }
        Add | AddAssign => lhs.wrapping_add(rhs),
        Subtract | SubtractAssign => lhs.wrapping_sub(rhs),
        Multiply | MultiplyAssign => lhs.wrapping_mul(rhs),
        Divide | DivideAssign => {
            require_non_zero(rhs, op_location)?;
            lhs.wrapping_div(rhs)
        }
        Remainder | RemainderAssign => {
            require_non_zero(rhs, op_location)?;
            lhs.wrapping_rem(rhs)
        }
        Power => lhs.wrapping_pow(rhs as u32),
        Assign => rhs,
    };
    Ok(Value::Integer(result))
}

/// Applies a binary operator.
fn apply_binary<'a, E: Env>(
    lhs: Term<'a>,
    rhs: Term<'a>,
    operator: BinaryOperator,
    op_location: &Range<usize>,
    env: &mut E,
) -> Result<Value, Error<E::AssignVariableError>> {
    use BinaryOperator::*;
    match operator {
        LogicalOr | LogicalAnd | BitwiseOr | BitwiseXor | BitwiseAnd | EqualTo | NotEqualTo
        | LessThan | GreaterThan | LessThanOrEqualTo | GreaterThanOrEqualTo | ShiftLeft
        | ShiftRight | Add | Subtract | Multiply | Divide | Remainder | Power => {
            let lhs = into_value(lhs, env)?;
            let rhs = into_value(rhs, env)?;
            binary_result(lhs, rhs, operator, op_location)
        }
        Assign => {
            let (name, location) = require_variable(lhs, op_location)?;
            let value = into_value(rhs, env)?;
            assign(name, value, location, env)
        }
        BitwiseOrAssign | BitwiseXorAssign | BitwiseAndAssign | ShiftLeftAssign
        | ShiftRightAssign | AddAssign | SubtractAssign | MultiplyAssign | DivideAssign
        | RemainderAssign => {
            let (name, location) = require_variable(lhs, op_location)?;
            let lhs = expand_variable(name, &location, env)?;
            let rhs = into_value(rhs, env)?;
            let result = binary_result(lhs, rhs, operator, op_location)?;
            assign(name, result, location, env)
        }
    }
}

/// Evaluates an expression.
///
/// The given `ast` must not be empty, or this function will **panic**.
pub fn eval<'a, E: Env>(
    ast: &[Ast<'a>],
    env: &mut E,
) -> Result<Term<'a>, Error<E::AssignVariableError>> {
    let (root, children) = ast.split_last().expect("evaluating an empty expression");
    match root {
        Ast::Term(term) => Ok(term.clone()),

        Ast::Prefix { operator, location } => {
            let term = eval(children, env)?;
            apply_prefix(term, *operator, location, env).map(Term::Value)
        }

        Ast::Postfix { operator, location } => {
            let term = eval(children, env)?;
            apply_postfix(term, *operator, location, env).map(Term::Value)
        }

        Ast::Binary {
            operator: BinaryOperator::LogicalOr,
            rhs_len,
            location,
        } => {
            let (lhs_ast, rhs_ast) = children.split_at(children.len() - rhs_len);
            let lhs = into_value(eval(lhs_ast, env)?, env)?;
            if lhs != Value::Integer(0) {
                return Ok(Term::Value(Value::Integer(1)));
            }
            let rhs = into_value(eval(rhs_ast, env)?, env)?;
            binary_result(lhs, rhs, BinaryOperator::LogicalOr, location).map(Term::Value)
        }

        Ast::Binary {
            operator: BinaryOperator::LogicalAnd,
            rhs_len,
            location,
        } => {
            let (lhs_ast, rhs_ast) = children.split_at(children.len() - rhs_len);
            let lhs = into_value(eval(lhs_ast, env)?, env)?;
            if lhs == Value::Integer(0) {
                return Ok(Term::Value(Value::Integer(0)));
            }
            let rhs = into_value(eval(rhs_ast, env)?, env)?;
            binary_result(lhs, rhs, BinaryOperator::LogicalAnd, location).map(Term::Value)
        }

        Ast::Binary {
            operator,
            rhs_len,
            location,
        } => {
            let (lhs_ast, rhs_ast) = children.split_at(children.len() - rhs_len);
            let lhs = eval(lhs_ast, env)?;
            let rhs = eval(rhs_ast, env)?;
            apply_binary(lhs, rhs, *operator, location, env).map(Term::Value)
        }

        Ast::Conditional { then_len, else_len } => {
            let (children_2, else_ast) = children.split_at(children.len() - else_len);
            let (condition_ast, then_ast) = children_2.split_at(children_2.len() - then_len);
            let condition = into_value(eval(condition_ast, env)?, env)?;
            let result_ast = if condition != Value::Integer(0) {
                then_ast
            } else {
                else_ast
            };
            eval(result_ast, env)
        }
    }
}
