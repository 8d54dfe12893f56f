// This file is part of posh, a POSIX-style shell.

//! Source code references for diagnostics
//!
//! Every token and AST leaf carries a [`Location`], a byte range into a
//! reference-counted [`Code`] buffer. This lets error messages quote the
//! offending source line instead of reporting only a cursor position.

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroU64;
use std::ops::Range;
use std::rc::Rc;

/// Where a piece of source code came from
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Source {
    /// Source of unknown or synthetic origin (used in tests)
    Unknown,
    /// The `-c` command-line operand
    CommandString,
    /// Interactive input read from the command-line REPL
    Interactive,
    /// A script file
    ScriptFile {
        /// Path to the script, as given on the command line
        path: String,
    },
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Unknown => write!(f, "<unknown>"),
            Source::CommandString => write!(f, "<command string>"),
            Source::Interactive => write!(f, "<stdin>"),
            Source::ScriptFile { path } => write!(f, "{path}"),
        }
    }
}

/// A growable buffer of source text together with where it came from
///
/// The buffer grows as a resumable lexer is fed more input; it never shrinks
/// or mutates already-written bytes, so [`Location`] ranges computed against
/// an earlier snapshot of `value` remain valid.
#[derive(Debug)]
pub struct Code {
    /// The source text read so far
    pub value: RefCell<String>,
    /// Line number of the first line in `value`
    pub start_line_number: NonZeroU64,
    /// Where this code came from
    pub source: Rc<Source>,
}

impl Code {
    /// Returns the 1-based line and column of a byte index into `value`.
    #[must_use]
    pub fn line_column(&self, index: usize) -> (u64, usize) {
        let value = self.value.borrow();
        let mut line = self.start_line_number.get();
        let mut last_newline = None;
        for (i, c) in value.char_indices() {
            if i >= index {
                break;
            }
            if c == '\n' {
                line += 1;
                last_newline = Some(i);
            }
        }
        let column_start = last_newline.map_or(0, |i| i + 1);
        let column = value[column_start..index.min(value.len())].chars().count() + 1;
        (line, column)
    }

    /// Returns the text of the line containing `index`.
    #[must_use]
    pub fn line_text(&self, index: usize) -> String {
        let value = self.value.borrow();
        let start = value[..index.min(value.len())]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let end = value[index.min(value.len())..]
            .find('\n')
            .map_or(value.len(), |i| index + i);
        value[start..end].to_string()
    }
}

/// Reference to a span of source code
#[derive(Clone, Debug)]
pub struct Location {
    /// The code this location refers into
    pub code: Rc<Code>,
    /// Byte range within `code.value`
    pub range: Range<usize>,
}

impl Location {
    /// Creates a location referring to a standalone, synthetic piece of code.
    ///
    /// This is mainly useful in tests where a real parse is not available.
    #[must_use]
    pub fn dummy<S: Into<String>>(value: S) -> Location {
        let value = value.into();
        let len = value.len();
        Location {
            code: Rc::new(Code {
                value: RefCell::new(value),
                start_line_number: NonZeroU64::new(1).unwrap(),
                source: Rc::new(Source::Unknown),
            }),
            range: 0..len,
        }
    }

    /// Returns the 1-based line number of the start of this location.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.code.line_column(self.range.start).0
    }

    /// Returns the 1-based column number of the start of this location.
    #[must_use]
    pub fn column_number(&self) -> usize {
        self.code.line_column(self.range.start).1
    }

    /// Returns the source text covered by this location.
    #[must_use]
    pub fn text(&self) -> String {
        self.code.value.borrow()[self.range.clone()].to_string()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.code, &other.code) && self.range == other.range
    }
}

impl Eq for Location {}

impl Default for Location {
    fn default() -> Self {
        Location::dummy("")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.code.source,
            self.line_number(),
            self.column_number()
        )
    }
}

/// A single character together with the location it was read from
#[derive(Clone, Debug)]
pub struct SourceChar {
    /// The character itself
    pub value: char,
    /// Where it came from
    pub location: Location,
}

/// Pairs each character of `s` with a [`Location`] into `code`.
///
/// `index_offset` is the byte offset of `s`'s first character within
/// `code.value`.
pub fn source_chars(
    s: &str,
    code: &Rc<Code>,
    index_offset: usize,
) -> impl Iterator<Item = SourceChar> + '_ {
    s.char_indices().map(move |(i, c)| SourceChar {
        value: c,
        location: Location {
            code: Rc::clone(code),
            range: (index_offset + i)..(index_offset + i + c.len_utf8()),
        },
    })
}
