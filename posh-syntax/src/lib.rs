// This file is part of posh, a POSIX-style shell.

//! Shell language syntax and parser
//!
//! This crate defines the AST for the shell language (see [`syntax`]) and a
//! recursive-descent parser that turns source text into it (see [`parser`]).
//!
//! Parsing goes through two layers: [`lexer`] turns source text into a
//! [`Token`](token::Token) stream (buffered and replayable via [`stream`]),
//! and [`parser`] turns that stream into a [`List`](syntax::List). The
//! lexer never classifies a reserved word as a keyword token; only the
//! parser does that, and only at the specific grammar positions where a
//! keyword is actually expected, so that `echo if` still parses as a plain
//! command with the argument `if`.
//!
//! [`pretty`] prints an AST back out as shell source; the printed form
//! always reparses to an equal tree.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod source;
pub mod stream;
pub mod syntax;
pub mod token;

pub use error::{Error, Expected, ParseError};
pub use parser::{ParseOutcome, Parser};
pub use source::{Location, Source};
pub use syntax::*;
