// This file is part of posh, a POSIX-style shell.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! This crate implements arithmetic expansion.
//!
//! Expressions are tokenized by [`token`], parsed into an [`ast::Ast`], and
//! evaluated by [`eval`]. Integer overflow wraps around in two's complement;
//! only division and remainder by zero are treated as fatal errors.
//!
//! TODO Elaborate

use std::fmt::Display;
use std::ops::Range;

mod ast;
mod env;
mod eval;
mod token;

pub use env::Env;
pub use token::TokenError;
pub use token::Value;

/// Cause of an arithmetic expansion error
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCause<E> {
    /// Error in tokenization
    TokenError(TokenError),
    /// Error in the syntax of the expression
    SyntaxError(ast::SyntaxError),
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

impl<E: Display> Display for ErrorCause<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorCause::*;
        match self {
            TokenError(e) => e.fmt(f),
            SyntaxError(_) => "syntax error".fmt(f),
            InvalidVariableValue(v) => {
                write!(f, "variable value {:?} cannot be parsed as a number", v)
            }
            DivisionByZero => "division by zero".fmt(f),
            LeftShiftingNegative => "left bit-shifting of a negative value".fmt(f),
            ReverseShifting => "bit-shifting with a negative right-hand-side operand".fmt(f),
            AssignmentToValue => "assignment to a non-variable value".fmt(f),
            AssignVariableError(e) => e.fmt(f),
        }
    }
}

/// Description of an error that occurred during expansion
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error<E> {
    /// Cause of the error
    pub cause: ErrorCause<E>,
    /// Range of the substring in the evaluated expression string where the error occurred
    pub location: Range<usize>,
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cause.fmt(f)
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for Error<E> {}

impl<E> From<ast::Error> for Error<E> {
    fn from(e: ast::Error) -> Self {
        let cause = match e.cause {
            ast::SyntaxError::TokenError(te) => ErrorCause::TokenError(te),
        };
        Error {
            cause,
            location: e.location,
        }
    }
}

impl<E> From<eval::Error<E>> for Error<E> {
    fn from(e: eval::Error<E>) -> Self {
        use eval::EvalError;
        let cause = match e.cause {
            EvalError::InvalidVariableValue(v) => ErrorCause::InvalidVariableValue(v),
            EvalError::DivisionByZero => ErrorCause::DivisionByZero,
            EvalError::LeftShiftingNegative => ErrorCause::LeftShiftingNegative,
            EvalError::ReverseShifting => ErrorCause::ReverseShifting,
            EvalError::AssignmentToValue => ErrorCause::AssignmentToValue,
            EvalError::AssignVariableError(inner) => ErrorCause::AssignVariableError(inner),
        };
        Error {
            cause,
            location: e.location,
        }
    }
}

/// Performs arithmetic expansion.
///
/// Arithmetic overflow wraps around in two's complement arithmetic; division
/// and remainder by zero are the only fatal arithmetic errors.
pub fn eval<E: Env>(expression: &str, env: &mut E) -> Result<Value, Error<E::AssignVariableError>> {
    let ast = ast::parse(token::Tokens::new(expression).peekable())?;
    let term = eval::eval(&ast, env)?;
    Ok(eval::into_value(term, env)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn decimal_integer_constants() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1", env), Ok(Value::Integer(1)));
        assert_eq!(eval("42", env), Ok(Value::Integer(42)));
    }

    #[test]
    fn octal_integer_constants() {
        let env = &mut HashMap::new();
        assert_eq!(eval("0", env), Ok(Value::Integer(0)));
        assert_eq!(eval("01", env), Ok(Value::Integer(1)));
        assert_eq!(eval("07", env), Ok(Value::Integer(7)));
        assert_eq!(eval("0123", env), Ok(Value::Integer(0o123)));
    }

    #[test]
    fn invalid_digit_in_octal_constant() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("08", env),
            Err(Error {
                cause: ErrorCause::TokenError(TokenError::InvalidNumericConstant),
                location: 0..2,
            })
        );
        assert_eq!(
            eval("0192", env),
            Err(Error {
                cause: ErrorCause::TokenError(TokenError::InvalidNumericConstant),
                location: 0..4,
            })
        );
    }

    #[test]
    fn space_around_token() {
        let env = &mut HashMap::new();
        assert_eq!(eval(" 12", env), Ok(Value::Integer(12)));
        assert_eq!(eval("12 ", env), Ok(Value::Integer(12)));
        assert_eq!(eval("\n 123 \t", env), Ok(Value::Integer(123)));
    }

    #[test]
    fn unset_variable() {
        let env = &mut HashMap::new();
        assert_eq!(eval("foo", env), Ok(Value::Integer(0)));
        assert_eq!(eval("bar", env), Ok(Value::Integer(0)));
    }

    #[test]
    fn integer_variable() {
        let env = &mut HashMap::new();
        env.insert("foo".to_string(), "42".to_string());
        env.insert("bar".to_string(), "123".to_string());
        assert_eq!(eval("foo", env), Ok(Value::Integer(42)));
        assert_eq!(eval("bar", env), Ok(Value::Integer(123)));
    }

    #[test]
    fn invalid_variable_value() {
        let env = &mut HashMap::new();
        env.insert("foo".to_string(), "".to_string());
        env.insert("bar".to_string(), "*".to_string());
        env.insert("oops".to_string(), "foo".to_string());
        assert_eq!(
            eval("foo", env),
            Err(Error {
                cause: ErrorCause::InvalidVariableValue("".to_string()),
                location: 0..3,
            })
        );
        assert_eq!(
            eval("bar", env),
            Err(Error {
                cause: ErrorCause::InvalidVariableValue("*".to_string()),
                location: 0..3,
            })
        );
        assert_eq!(
            eval("  oops ", env),
            Err(Error {
                cause: ErrorCause::InvalidVariableValue("foo".to_string()),
                location: 2..6,
            })
        );
    }

    #[test]
    fn simple_assignment_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("a=1", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" foo = 42 ", env), Ok(Value::Integer(42)));

        assert_eq!(env["a"], "1");
        assert_eq!(env["foo"], "42");
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn boolean_logic_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("0||0", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 1 || 0 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 0 || 1 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval("2 || 3", env), Ok(Value::Integer(1)));

        assert_eq!(eval("0&&0", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 1 && 0 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 0 && 1 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval("2 && 3", env), Ok(Value::Integer(1)));
    }

    #[test]
    fn conditional_evaluation_in_boolean_logic_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("(a = 0) || (b = 2)", env), Ok(Value::Integer(1)));
        assert_eq!(env["a"], "0");
        assert_eq!(env["b"], "2");

        let env = &mut HashMap::new();
        assert_eq!(eval("(a = 3) || (b = 2)", env), Ok(Value::Integer(1)));
        assert_eq!(env["a"], "3");
        assert_eq!(env.get("b"), None);

        let env = &mut HashMap::new();
        assert_eq!(eval("(a = 0) && (b = 2)", env), Ok(Value::Integer(0)));
        assert_eq!(env["a"], "0");
        assert_eq!(env.get("b"), None);

        let env = &mut HashMap::new();
        assert_eq!(eval("(a = 3) && (b = 2)", env), Ok(Value::Integer(1)));
        assert_eq!(env["a"], "3");
        assert_eq!(env["b"], "2");

        let env = &mut HashMap::new();
        env.insert("x".to_string(), "@".to_string());
        assert_eq!(eval("0 && (x || x)", env), Ok(Value::Integer(0)));
        assert_eq!(eval("1 || x && x", env), Ok(Value::Integer(1)));
    }

    #[test]
    fn bitwise_logic_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("3|5", env), Ok(Value::Integer(7)));
        assert_eq!(eval(" 5 | 3 ", env), Ok(Value::Integer(7)));
        assert_eq!(eval(" 10 | 10 ", env), Ok(Value::Integer(10)));
        assert_eq!(eval(" 7 | 14 | 28 ", env), Ok(Value::Integer(31)));

        assert_eq!(eval("3^5", env), Ok(Value::Integer(6)));
        assert_eq!(eval(" 5 ^ 3 ", env), Ok(Value::Integer(6)));
        assert_eq!(eval(" 10 ^ 10 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 7 ^ 14 ^ 28 ", env), Ok(Value::Integer(21)));

        assert_eq!(eval("3&5", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 5 & 3 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 10 & 10 ", env), Ok(Value::Integer(10)));
        assert_eq!(eval(" 7 & 14 & 28 ", env), Ok(Value::Integer(4)));
    }

    #[test]
    fn equality_comparison_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1==2", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 2 == 1 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 5 == 5 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 1 == 2 == 2 ", env), Ok(Value::Integer(0)));

        assert_eq!(eval("1!=2", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 2 != 1 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 5 != 5 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 1 != 1 != 2 ", env), Ok(Value::Integer(1)));
    }

    #[test]
    fn inequality_comparison_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1<2", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 2 < 1 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 5 < 5 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 3 < 3 < 3 ", env), Ok(Value::Integer(1)));

        assert_eq!(eval("1<=2", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 2 <= 1 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 5 <= 5 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 3 <= 3 <= 3 ", env), Ok(Value::Integer(1)));

        assert_eq!(eval("1>2", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 2 > 1 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 5 > 5 ", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 3 > 3 > 3 ", env), Ok(Value::Integer(0)));

        assert_eq!(eval("1>=2", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 2 >= 1 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 5 >= 5 ", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 3 >= 3 >= 3 ", env), Ok(Value::Integer(0)));
    }

    #[test]
    fn bit_shift_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("5<<3", env), Ok(Value::Integer(40)));
        assert_eq!(eval(" 3 << 5 ", env), Ok(Value::Integer(96)));
        assert_eq!(eval(" 2 << 2 << 2 ", env), Ok(Value::Integer(32)));

        assert_eq!(eval("64>>3", env), Ok(Value::Integer(8)));
        assert_eq!(eval(" 63 >> 3 ", env), Ok(Value::Integer(7)));
        assert_eq!(eval(" 2 >> 2 >> 2 ", env), Ok(Value::Integer(0)));
    }

    #[test]
    fn bit_shifting_wraps_on_overflow() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("0x4000000000000000<<1", env),
            Ok(Value::Integer(i64::MIN))
        );
        assert_eq!(eval("0<<1000", env), Ok(Value::Integer(0)));
        assert_eq!(eval("0>>1000", env), Ok(Value::Integer(0)));
    }

    #[test]
    fn addition_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1+2", env), Ok(Value::Integer(3)));
        assert_eq!(eval(" 12 + 34 ", env), Ok(Value::Integer(46)));
        assert_eq!(eval(" 3 + 16 + 5 ", env), Ok(Value::Integer(24)));
    }

    #[test]
    fn addition_wraps_on_overflow() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("9223372036854775807+1", env),
            Ok(Value::Integer(i64::MIN))
        );
    }

    #[test]
    fn subtraction_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("2-1", env), Ok(Value::Integer(1)));
        assert_eq!(eval(" 42 - 15 ", env), Ok(Value::Integer(27)));
        assert_eq!(eval(" 10 - 7 - 5 ", env), Ok(Value::Integer(-2)));
    }

    #[test]
    fn subtraction_wraps_on_overflow() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("0-9223372036854775807-2", env),
            Ok(Value::Integer(i64::MAX))
        );
    }

    #[test]
    fn multiplication_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("3*6", env), Ok(Value::Integer(18)));
        assert_eq!(eval(" 5 * 11 ", env), Ok(Value::Integer(55)));
        assert_eq!(eval(" 2 * 3 * 4 ", env), Ok(Value::Integer(24)));
    }

    #[test]
    fn multiplication_wraps_on_overflow() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("0x100000000 * 0x80000000", env),
            Ok(Value::Integer(i64::MIN))
        );
    }

    #[test]
    fn division_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("6/2", env), Ok(Value::Integer(3)));
        assert_eq!(eval(" 120 / 24 ", env), Ok(Value::Integer(5)));
        assert_eq!(eval(" 120/10/5 ", env), Ok(Value::Integer(2)));
    }

    #[test]
    fn division_by_zero() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1/0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
        assert_eq!(
            eval("0/0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
        assert_eq!(
            eval("10/0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 2..3,
            })
        );
    }

    #[test]
    fn remainder_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("6%2", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" 17 % 5 ", env), Ok(Value::Integer(2)));
        assert_eq!(eval(" 42 % 11 % 5 ", env), Ok(Value::Integer(4)));
    }

    #[test]
    fn remainder_by_zero() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1%0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
        assert_eq!(
            eval("0%0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
        assert_eq!(
            eval("10%0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 2..3,
            })
        );
    }

    #[test]
    fn plus_prefix_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("+0", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" + 10 ", env), Ok(Value::Integer(10)));
        assert_eq!(eval(" + + 57", env), Ok(Value::Integer(57)));
    }

    #[test]
    fn numeric_negation_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("-0", env), Ok(Value::Integer(0)));
        assert_eq!(eval(" - 12 ", env), Ok(Value::Integer(-12)));
        assert_eq!(eval(" - - 49", env), Ok(Value::Integer(49)));
        assert_eq!(eval(" - - - 49", env), Ok(Value::Integer(-49)));
    }

    #[test]
    fn numeric_negation_wraps_at_min() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("-0x7FFFFFFFFFFFFFFF-1", env),
            Ok(Value::Integer(i64::MIN))
        );
        assert_eq!(
            eval(" - (-0x7FFFFFFFFFFFFFFF-1)", env),
            Ok(Value::Integer(i64::MIN))
        );
    }

    #[test]
    fn bitwise_negation_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("~0", env), Ok(Value::Integer(-1)));
        assert_eq!(eval(" ~ 3 ", env), Ok(Value::Integer(!3)));
        assert_eq!(eval(" ~ ~ 42", env), Ok(Value::Integer(42)));
        assert_eq!(eval(" ~ ~ ~ 0x38E7", env), Ok(Value::Integer(!0x38E7)));
    }

    #[test]
    fn postfix_increment_and_decrement() {
        let env = &mut HashMap::new();
        env.insert("a".to_string(), "1".to_string());
        assert_eq!(eval("a++", env), Ok(Value::Integer(1)));
        assert_eq!(env["a"], "2");
        assert_eq!(eval("a--", env), Ok(Value::Integer(2)));
        assert_eq!(env["a"], "1");
    }

    #[test]
    fn ternary_conditional_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1 ? 2 : 3", env), Ok(Value::Integer(2)));
        assert_eq!(eval("0 ? 2 : 3", env), Ok(Value::Integer(3)));
    }

    #[test]
    fn combining_operators_of_same_precedence() {
        let env = &mut HashMap::new();
        assert_eq!(eval("2+5-3", env), Ok(Value::Integer(4)));
    }

    #[test]
    fn combining_operators_of_different_precedences() {
        let env = &mut HashMap::new();
        assert_eq!(eval("2+3*4", env), Ok(Value::Integer(14)));
        assert_eq!(eval("2*3+4", env), Ok(Value::Integer(10)));
    }

    #[test]
    fn parentheses() {
        let env = &mut HashMap::new();
        assert_eq!(eval("(42)", env), Ok(Value::Integer(42)));
        assert_eq!(eval("(1+2)", env), Ok(Value::Integer(3)));
        assert_eq!(eval("(2+3)*4", env), Ok(Value::Integer(20)));
        assert_eq!(eval("2*(3+4)", env), Ok(Value::Integer(14)));
        assert_eq!(eval(" ( 6 - ( 7 - 3 ) ) * 2 ", env), Ok(Value::Integer(4)));
        assert_eq!(eval(" 4 | ( ( 2 && 2 ) & 3 )", env), Ok(Value::Integer(5)));
    }
}
