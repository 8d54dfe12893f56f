// This file is part of posh, a POSIX-style shell.

//! Parser error types

use crate::lexer::LexError;
use crate::source::Location;
use crate::token::{Keyword, Operator};

/// What the parser expected to see instead of the offending token
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expected {
    Word,
    Name,
    Keyword(Keyword),
    Operator(Operator),
    CompoundCommandBody,
    CaseItemOrEsac,
    RedirectionTarget,
}

/// A grammar violation
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("expected {expected:?} at {location}, found {found}")]
pub struct ParseError {
    pub expected: Expected,
    pub found: String,
    pub location: Location,
}

/// Errors the parser can report
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] ParseError),
    /// `<<`/`<<-`: lexed as operators but heredoc bodies are out of scope.
    #[error("unsupported construct at {0}")]
    Unsupported(Location),
    /// Internal signal raised when a grammar rule hits EOF with an open
    /// construct (an `if` with no `then`, an unmatched `{`, ...). Single-shot
    /// parsing turns this into [`Error::IncompleteInput`]; resumable parsing
    /// catches it and asks for another chunk instead of surfacing an error.
    #[error("incomplete construct at {0}")]
    NeedsMore(Location),
    /// Single-shot parsing reached EOF with a construct still open.
    #[error("incomplete input at {0}")]
    IncompleteInput(Location),
}
