// This file is part of posh, a POSIX-style shell.

//! This crate provides the [`Pattern`] type that performs pattern matching
//! based on a globbing pattern.
//!
//! This implementation supports the following syntax in patterns:
//!
//! - Any single character (`?`)
//! - Any character sequence (`*`)
//! - Bracket expression (`[...]`)
//!     - Character literals
//!     - Character ranges (e.g. `a-z`)
//!     - Complement (`[!...]`)
//!     - Collating symbols (e.g. `[.ch.]`)
//!     - Equivalence classes (e.g. `[=a=]`)
//!     - Character classes (`[:alpha:]`)
//!
//! The current implementation does not support any locale-specific
//! characteristics. Especially, collating symbols and equivalent classes only
//! match the specified character sequence itself, and character classes only
//! match ASCII characters.
//!
//! This crate works by converting the pattern to a regular expression and
//! delegating the actual matching to the [`regex`] crate. [`Config`] controls
//! whether the match is anchored at the start and/or the end of the subject,
//! which is what lets the same pattern machinery serve both whole-string
//! matching (globbing, `case`) and prefix/suffix matching (the `#`/`##`/`%`/
//! `%%` parameter expansion modifiers).

pub mod ast;
mod char_iter;

pub use char_iter::{with_escape, without_escape, PatternChar, WithEscape, WithoutEscape};

/// Configuration for converting a pattern to a regular expression
///
/// Only [`Ast::to_regex`](ast::Ast::to_regex) and the [`Pattern`] constructors
/// consult this; it has no effect on parsing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Whether the match must start at the beginning of the subject string
    pub anchor_begin: bool,
    /// Whether the match must end at the end of the subject string
    pub anchor_end: bool,
}

impl Config {
    /// Returns a configuration that anchors both ends, as needed for
    /// whole-string matching (globbing, `case` patterns).
    #[must_use]
    pub fn full_match() -> Self {
        Config {
            anchor_begin: true,
            anchor_end: true,
        }
    }
}

/// Errors that may occur in parsing a pattern or converting it to a regular
/// expression
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// A bracket expression contains an undefined character class name.
    #[error("undefined character class `{0}`")]
    UndefinedCharClass(String),

    /// A character class appears as an endpoint of a character range.
    #[error("character class `{0}` cannot be used as a range endpoint")]
    CharClassInRange(String),

    /// A collating symbol or equivalence class is empty (`[..]` or `[==]`).
    #[error("collating symbol or equivalence class must not be empty")]
    EmptyCollatingSymbol,

    /// A bracket expression contains no items (`[]` with only a leading `!`).
    #[error("bracket expression must not be empty")]
    EmptyBracket,

    /// The regular expression built from the pattern failed to compile.
    ///
    /// This should not happen for any pattern accepted by [`ast::Ast::new`];
    /// it exists only so regex-crate failures surface as a [`Pattern::parse`]
    /// error rather than a panic.
    #[error("failed to compile pattern: {0}")]
    Regex(String),
}

/// Compiled globbing pattern
///
/// A `Pattern` is built from an iterator of [`PatternChar`]s (see
/// [`with_escape`] and [`without_escape`]) and matches against whole strings
/// using [`Regex`](regex::Regex) under the hood.
#[derive(Clone, Debug)]
pub struct Pattern {
    ast: ast::Ast,
    regex: regex::Regex,
}

impl Pattern {
    /// Parses a pattern, anchoring the match at both ends.
    ///
    /// This is the right choice for globbing and `case` patterns, which must
    /// match the whole subject string.
    pub fn parse<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        Self::with_config(pattern, Config::full_match())
    }

    /// Parses a pattern with an explicit anchoring configuration.
    ///
    /// Parameter expansion's `#`/`##`/`%`/`%%` modifiers anchor only one end
    /// of the pattern so the shortest or longest matching prefix/suffix can
    /// be located with [`Pattern::find`].
    pub fn with_config<I>(pattern: I, config: Config) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
        <I as IntoIterator>::IntoIter: Clone,
    {
        let ast = ast::Ast::new(pattern)?;
        let source = ast.to_regex(&config)?;
        let regex = regex::Regex::new(&source).map_err(|e| Error::Regex(e.to_string()))?;
        Ok(Pattern { ast, regex })
    }

    /// Returns the parsed abstract syntax tree of this pattern.
    #[must_use]
    pub fn ast(&self) -> &ast::Ast {
        &self.ast
    }

    /// Returns the regular expression this pattern compiles to.
    #[must_use]
    pub fn as_regex(&self) -> &regex::Regex {
        &self.regex
    }

    /// Tests whether this pattern matches the given string.
    #[must_use]
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }

    /// Finds the leftmost match of this pattern in the given string.
    #[must_use]
    pub fn find<'a>(&self, s: &'a str) -> Option<regex::Match<'a>> {
        self.regex.find(s)
    }
}
