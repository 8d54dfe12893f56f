// This file is part of posh, a POSIX-style shell.

//! Abstract syntax tree produced by the [parser](crate::parser)
//!
//! Words are kept as a typed tree of [`WordUnit`]/[`TextUnit`] values rather
//! than raw source text, so that quote provenance survives from the lexer
//! all the way to the expander (see `posh-expand`).

use crate::source::Location;
use std::rc::Rc;

/// A piece of text inside a word, already classified by the lexer
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextUnit {
    /// A run of characters with no special meaning
    Literal(String),
    /// A single character that followed an unquoted backslash
    Backslashed(char),
    /// `$name` or a single-character special parameter (`$@`, `$1`, ...)
    RawParam { name: String, location: Location },
    /// `${name...}`, possibly with a modifier
    BracedParam {
        name: String,
        modifier: Modifier,
        location: Location,
    },
    /// `$(...)`
    CommandSubst { content: String, location: Location },
    /// `` `...` ``
    Backquote { content: String, location: Location },
    /// `$((...))`
    Arith { content: String, location: Location },
}

/// A parameter expansion modifier, as in `${name<modifier>}`
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Modifier {
    /// No modifier: `${name}`
    None,
    /// `${#name}`
    Length,
    /// `${name:-word}`
    DefaultIfUnsetOrEmpty(Word),
    /// `${name:=word}`
    AssignIfUnsetOrEmpty(Word),
    /// `${name:?word}`
    ErrorIfUnsetOrEmpty(Word),
    /// `${name:+word}`
    AlternateIfNotEmpty(Word),
    /// `${name#pattern}`
    RemoveSmallestPrefix(Word),
    /// `${name##pattern}`
    RemoveLargestPrefix(Word),
    /// `${name%pattern}`
    RemoveSmallestSuffix(Word),
    /// `${name%%pattern}`
    RemoveLargestSuffix(Word),
    /// `${name/pattern/replacement}`
    ReplaceFirst(Word, Word),
    /// `${name//pattern/replacement}`
    ReplaceAll(Word, Word),
    /// `${name/#pattern/replacement}`
    ReplacePrefix(Word, Word),
    /// `${name/%pattern/replacement}`
    ReplaceSuffix(Word, Word),
    /// `${name^}`
    UppercaseFirst,
    /// `${name^^}`
    UppercaseAll,
    /// `${name,}`
    LowercaseFirst,
    /// `${name,,}`
    LowercaseAll,
}

/// A segment of a [`Word`], carrying its own quoting
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordUnit {
    /// Text outside any quotes
    Unquoted(TextUnit),
    /// `'...'`; the content matches itself verbatim
    SingleQuoted(String),
    /// `"..."`, containing nested text units
    DoubleQuoted(Vec<TextUnit>),
    /// A leading `~` or `~name` tilde expansion prefix
    Tilde(String),
}

/// How a [word](Word) was quoted, for the expander's benefit
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteProvenance {
    /// No part of the word was quoted
    Unquoted,
    /// The whole word was a single `'...'`
    SingleQuoted,
    /// The whole word was a single `"..."`
    DoubleQuoted,
    /// Differently-quoted segments were concatenated, e.g. `a"b"'c'`
    Mixed,
}

/// A lexer/parser word: a sequence of quoted and unquoted segments
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Word {
    pub units: Vec<WordUnit>,
    pub location: Location,
}

impl Word {
    /// Computes this word's overall quote provenance.
    #[must_use]
    pub fn quote_provenance(&self) -> QuoteProvenance {
        use QuoteProvenance::*;
        let mut result = None;
        for unit in &self.units {
            let this = match unit {
                WordUnit::Unquoted(_) | WordUnit::Tilde(_) => Unquoted,
                WordUnit::SingleQuoted(_) => SingleQuoted,
                WordUnit::DoubleQuoted(_) => DoubleQuoted,
            };
            result = Some(match result {
                None => this,
                Some(prev) if prev == this => prev,
                Some(_) => Mixed,
            });
        }
        result.unwrap_or(Unquoted)
    }
}

/// `VAR=value` attached as a prefix to a [simple command](SimpleCommand)
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Word,
    pub location: Location,
}

/// A redirection operator
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `<`
    FileIn,
    /// `>`
    FileOut,
    /// `>>`
    Append,
    /// `<&`
    DupIn,
    /// `>&`
    DupOut,
    /// `&>` (extension: redirect both stdout and stderr to a file)
    FileOutErr,
}

impl RedirOp {
    /// Returns the file descriptor this operator defaults to when no
    /// explicit `n` prefix is given.
    #[must_use]
    pub fn default_fd(self) -> u32 {
        match self {
            RedirOp::FileIn | RedirOp::DupIn => 0,
            RedirOp::FileOut | RedirOp::Append | RedirOp::DupOut | RedirOp::FileOutErr => 1,
        }
    }
}

/// `[n]op word`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redirection {
    pub fd: u32,
    pub op: RedirOp,
    pub target: Word,
    pub location: Location,
}

/// `name word* (word|redirection)*`, or a bare assignment list
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimpleCommand {
    pub assignments: Vec<Assignment>,
    pub words: Vec<Word>,
    pub redirections: Vec<Redirection>,
    pub location: Location,
}

/// `if cond then body (elif cond then body)* [else body] fi`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IfClause {
    pub condition: List,
    pub body: List,
    pub elifs: Vec<(List, List)>,
    pub else_branch: Option<List>,
    pub location: Location,
}

/// `while cond do body done` / `until cond do body done`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoopClause {
    pub condition: List,
    pub body: List,
    /// `true` for `until`, which loops while the condition is false
    pub negate_condition: bool,
    pub location: Location,
}

/// `for name [in word*] do body done`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ForClause {
    pub name: String,
    /// `None` means no `in` clause was given: iterate the positional parameters.
    pub words: Option<Vec<Word>>,
    pub body: List,
    pub location: Location,
}

/// One `pattern (| pattern)* ) list ;;` arm of a [`CaseClause`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    pub patterns: Vec<Word>,
    pub body: List,
    pub location: Location,
}

/// `case word in case_item* esac`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseClause {
    pub subject: Word,
    pub items: Vec<CaseItem>,
    pub location: Location,
}

/// The body of a [compound command](CompoundCommand)
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    If(IfClause),
    While(LoopClause),
    For(ForClause),
    Case(CaseClause),
    /// `{ list }`
    Brace(List),
    /// `( list )`: a reserved extension point, executed in a forked
    /// environment by the executor.
    Subshell(List),
}

/// `[function] name () compound_command`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    /// Shared so every invocation of the function reuses the same tree.
    pub body: Rc<Command>,
    pub location: Location,
}

/// A command, as it appears in a [`Pipeline`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound {
        command: CompoundCommand,
        redirections: Vec<Redirection>,
        location: Location,
    },
    Function(FunctionDef),
}

impl Command {
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Command::Simple(c) => &c.location,
            Command::Compound { location, .. } => location,
            Command::Function(f) => &f.location,
        }
    }
}

/// `[!] command (| command)*`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    pub negated: bool,
    pub commands: Vec<Command>,
    pub location: Location,
}

/// `&&` or `||`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Connector {
    And,
    Or,
}

/// A left-associative chain of pipelines joined by `&&`/`||`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(Connector, Pipeline)>,
    pub location: Location,
}

/// Whether a [list item](Item) runs in the foreground or background
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// Separated by `;` or a newline
    Sequential,
    /// Separated by `&`
    Background,
}

/// One statement within a [`List`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    pub and_or: AndOrList,
    pub terminator: Terminator,
}

/// A sequence of statements, the top-level unit produced by the parser
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List {
    pub items: Vec<Item>,
}

impl List {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
