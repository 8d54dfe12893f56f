// This file is part of posh, a POSIX-style shell.

//! Errors produced while expanding a word

/// Something that went wrong while expanding a word
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ExpansionError {
    /// `${name:?message}` on an unset or empty parameter
    #[error("{name}: {message}")]
    ErrorIfUnsetOrEmpty { name: String, message: String },

    /// A reference to an unset parameter with `nounset` (`set -u`) in effect
    #[error("{name}: unbound variable")]
    UnsetVariable { name: String },

    /// `${name:=word}` where `name` is a positional or special parameter
    #[error("{name}: cannot assign in this context")]
    CannotAssign { name: String },

    /// Arithmetic expansion (`$((...))`) failed
    #[error("arithmetic error: {message}")]
    Arith { message: String },

    /// A malformed glob pattern in a parameter modifier or pathname expansion
    #[error("invalid pattern: {message}")]
    Pattern { message: String },

    /// Command substitution (`$(...)` or `` `...` ``) failed
    #[error("command substitution failed: {message}")]
    CommandSubst { message: String },
}
