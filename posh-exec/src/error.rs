// This file is part of posh, a POSIX-style shell.

//! Errors the executor reports as a non-zero status rather than unwinding
//! as a [`crate::divert::Divert`]

/// Something that went wrong while executing a command, short of a
/// control-flow signal.
///
/// Per the error-handling policy, none of these abort the whole shell: the
/// executor logs the message and treats the offending simple command as
/// having failed (status 1), then lets ordinary and-or/pipeline/`errexit`
/// semantics decide what happens next.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ExecError {
    #[error("{0}")]
    Expansion(#[from] posh_expand::error::ExpansionError),

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("redirection error: {0}")]
    Redirection(String),

    #[error("{0}")]
    Host(String),
}
