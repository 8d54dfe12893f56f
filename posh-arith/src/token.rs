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

//! Tokenization

use std::fmt::Display;
use std::iter::FusedIterator;
use std::ops::Range;
use thiserror::Error;

/// Result of evaluating an expression
///
/// TODO: The current implementation only supports integer arithmetic. A future
/// version may also support floating-point numbers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    Integer(i64),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => i.fmt(f),
        }
    }
}

/// Intermediate result of evaluating part of an expression
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Term<'a> {
    /// Value
    Value(Value),
    /// Variable
    Variable {
        /// Variable name
        name: &'a str,
        /// Range of the substring in the evaluated expression where the variable occurs
        location: Range<usize>,
    },
}

/// Operator
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `|`
    Bar,
    /// `||`
    BarBar,
    /// `|=`
    BarEqual,
    /// `^`
    Caret,
    /// `^=`
    CaretEqual,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `&=`
    AndEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `<<`
    LessLess,
    /// `<<=`
    LessLessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `>>`
    GreaterGreater,
    /// `>>=`
    GreaterGreaterEqual,
    /// `+`
    Plus,
    /// `++`
    PlusPlus,
    /// `+=`
    PlusEqual,
    /// `-`
    Minus,
    /// `--`
    MinusMinus,
    /// `-=`
    MinusEqual,
    /// `*`
    Asterisk,
    /// `**`
    AsteriskAsterisk,
    /// `*=`
    AsteriskEqual,
    /// `/`
    Slash,
    /// `/=`
    SlashEqual,
    /// `%`
    Percent,
    /// `%=`
    PercentEqual,
    /// `~`
    Tilde,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
}

/// Atomic lexical element of an expression
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Token<'a> {
    /// Term: a constant value or variable
    Term(Term<'a>),
    /// Operator
    Operator {
        /// Operator
        operator: Operator,
        /// Range of the substring where the operator occurs in the parsed expression
        location: Range<usize>,
    },
}

/// Cause of a tokenization error
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// A value token contains an invalid character.
    #[error("invalid numeric constant")]
    InvalidNumericConstant,

    /// An expression contains a character that is not a whitespace, operator,
    /// or number.
    #[error("invalid character")]
    InvalidCharacter,
}

/// Description of an error that occurred during expansion
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error {
    /// Cause of the error
    pub cause: TokenError,
    /// Range of the substring in the evaluated expression string where the error occurred
    pub location: Range<usize>,
}

/// List of all the operators.
///
/// If a prefix of a valid operator is another operator, the prefix (the shorter
/// operator) must appear after the longer. With this ordering, we can
/// short-circuit unnecessary matching on finding a first match.
const OPERATORS: &[(&str, Operator)] = &[
    ("?", Operator::Question),
    (":", Operator::Colon),
    ("|=", Operator::BarEqual),
    ("||", Operator::BarBar),
    ("|", Operator::Bar),
    ("^=", Operator::CaretEqual),
    ("^", Operator::Caret),
    ("&=", Operator::AndEqual),
    ("&&", Operator::AndAnd),
    ("&", Operator::And),
    ("==", Operator::EqualEqual),
    ("=", Operator::Equal),
    ("!=", Operator::BangEqual),
    ("<=", Operator::LessEqual),
    ("<<=", Operator::LessLessEqual),
    ("<<", Operator::LessLess),
    ("<", Operator::Less),
    (">=", Operator::GreaterEqual),
    (">>=", Operator::GreaterGreaterEqual),
    (">>", Operator::GreaterGreater),
    (">", Operator::Greater),
    ("+=", Operator::PlusEqual),
    ("++", Operator::PlusPlus),
    ("+", Operator::Plus),
    ("-=", Operator::MinusEqual),
    ("--", Operator::MinusMinus),
    ("-", Operator::Minus),
    ("**", Operator::AsteriskAsterisk),
    ("*=", Operator::AsteriskEqual),
    ("*", Operator::Asterisk),
    ("/=", Operator::SlashEqual),
    ("/", Operator::Slash),
    ("%=", Operator::PercentEqual),
    ("%", Operator::Percent),
    ("~", Operator::Tilde),
    ("!", Operator::Bang),
    ("(", Operator::OpenParen),
    (")", Operator::CloseParen),
];

/// Iterator extracting tokens from a string
///
/// `Tokens` yields `None` once the whole expression has been consumed, so it
/// can be used directly as `I: Iterator<Item = Result<Token<'a>, Error>>`
/// wherever the parser expects, including after `.peekable()`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tokens<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    /// Creates a tokenizer.
    pub fn new(source: &'a str) -> Self {
        Tokens { source, index: 0 }
    }

    fn next_token(&mut self) -> Option<Result<Token<'a>, Error>> {
        let source = self.source[self.index..].trim_start();
        let start_of_token = self.source.len() - source.len();
        let first_char = source.chars().next()?;

        if let Some((lexeme, operator)) = OPERATORS
            .iter()
            .copied()
            .find(|&(lexeme, _)| source.starts_with(lexeme))
        {
            // Okay, this is an operator.
            let end_of_token = start_of_token + lexeme.len();
            let location = start_of_token..end_of_token;
            self.index = end_of_token;
            Some(Ok(Token::Operator { operator, location }))
        } else {
            // The next token should be a term. Try parsing it.
            let remainder = source.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_');
            let token_len = source.len() - remainder.len();
            if token_len == 0 {
                return Some(Err(Error {
                    cause: TokenError::InvalidCharacter,
                    location: start_of_token..start_of_token + 1,
                }));
            }
            let end_of_token = start_of_token + token_len;
            let location = start_of_token..end_of_token;
            let token = &source[..token_len];
            let term = if first_char.is_ascii_digit() {
                let parse = if let Some(token_source) = token.strip_prefix("0X") {
                    i64::from_str_radix(token_source, 0x10)
                } else if let Some(token_source) = token.strip_prefix("0x") {
                    i64::from_str_radix(token_source, 0x10)
                } else if source.starts_with('0') {
                    i64::from_str_radix(token, 0o10)
                } else {
                    token.parse()
                };
                match parse {
                    Ok(i) => Term::Value(Value::Integer(i)),
                    Err(_) => {
                        return Some(Err(Error {
                            cause: TokenError::InvalidNumericConstant,
                            location,
                        }));
                    }
                }
            } else {
                Term::Variable {
                    name: token,
                    location: location.clone(),
                }
            };

            self.index = end_of_token;
            Some(Ok(Token::Term(term)))
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Result<Token<'a>, Error>> {
        self.next_token()
    }
}

impl FusedIterator for Tokens<'_> {}
