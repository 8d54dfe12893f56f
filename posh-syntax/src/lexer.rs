// This file is part of posh, a POSIX-style shell.

//! Character-classifying tokenizer that preserves quoting provenance
//!
//! The lexer is a direct hand-written DFA over the input characters. It does
//! not know about command-start position or reserved words; every reserved
//! word still comes out as a plain `WORD` token, and the
//! [parser](crate::parser) is the one that treats it as a keyword when it
//! appears where a keyword is expected.
//!
//! Quoted and `$`-prefixed constructs are recognized directly by the lexer
//! and folded into a typed [`Word`] tree (see [`crate::syntax`]) rather than
//! passed on as raw text, so the expander never has to re-tokenize a word.

use crate::source::{Code, Location, Source};
use crate::syntax::{Modifier, TextUnit, Word, WordUnit};
use crate::token::{Operator, Token, TokenKind};
use std::cell::RefCell;
use std::num::NonZeroU64;
use std::rc::Rc;

/// Errors the lexer can report
///
/// An unterminated construct is reported the same way regardless of whether
/// the caller is running in single-shot or resumable mode; it is the
/// [parser](crate::parser) that decides whether an unterminated error means
/// "needs more input" or a hard failure.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated single-quoted string starting at {0}")]
    UnterminatedSingleQuote(Location),
    #[error("unterminated double-quoted string starting at {0}")]
    UnterminatedDoubleQuote(Location),
    #[error("unterminated backquoted string starting at {0}")]
    UnterminatedBackquote(Location),
    #[error("unterminated command substitution starting at {0}")]
    UnterminatedCommandSubst(Location),
    #[error("unterminated arithmetic expansion starting at {0}")]
    UnterminatedArith(Location),
    #[error("unterminated parameter expansion starting at {0}")]
    UnterminatedParam(Location),
    #[error("backslash at end of input at {0}")]
    TrailingBackslash(Location),
}

impl LexError {
    /// Returns the location the unterminated construct started at. Every
    /// variant of this enum is an "incomplete input" signal in resumable
    /// mode, so the parser only needs this one accessor.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            LexError::UnterminatedSingleQuote(l)
            | LexError::UnterminatedDoubleQuote(l)
            | LexError::UnterminatedBackquote(l)
            | LexError::UnterminatedCommandSubst(l)
            | LexError::UnterminatedArith(l)
            | LexError::UnterminatedParam(l)
            | LexError::TrailingBackslash(l) => l,
        }
    }
}

/// A resumable, character-at-a-time tokenizer
pub struct Lexer {
    code: Rc<Code>,
    chars: Vec<char>,
    pos: usize,
}

/// Two-character and three-character operators, longest match first
const MULTI_CHAR_OPERATORS: &[(&str, Operator)] = &[
    (";;", Operator::DSemicolon),
    ("&&", Operator::AndAnd),
    ("||", Operator::OrOr),
    ("<<-", Operator::DLessDash),
    ("<<", Operator::DLess),
    (">>", Operator::DGreat),
    ("<&", Operator::LessAmp),
    (">&", Operator::GreatAmp),
    ("&>", Operator::AmpGreat),
    ("|&", Operator::PipeAmp),
];

const SINGLE_CHAR_OPERATORS: &[(char, Operator)] = &[
    ('|', Operator::Pipe),
    ('&', Operator::Amp),
    (';', Operator::Semicolon),
    ('(', Operator::OpenParen),
    (')', Operator::CloseParen),
    ('<', Operator::Less),
    ('>', Operator::Great),
];

impl Lexer {
    /// Creates a lexer over `text`, attributed to `source`.
    #[must_use]
    pub fn new(text: &str, source: Source) -> Self {
        let code = Rc::new(Code {
            value: RefCell::new(text.to_string()),
            start_line_number: NonZeroU64::new(1).unwrap(),
            source: Rc::new(source),
        });
        Lexer {
            chars: text.chars().collect(),
            code,
            pos: 0,
        }
    }

    /// Appends more input to the end of the buffer, for resumable parsing.
    pub fn feed(&mut self, more: &str) {
        self.code.value.borrow_mut().push_str(more);
        self.chars.extend(more.chars());
    }

    /// Returns the location of the source consumed so far (for diagnostics
    /// about "end of input").
    #[must_use]
    pub fn eof_location(&self) -> Location {
        Location {
            code: Rc::clone(&self.code),
            range: self.pos..self.pos,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, k: usize) -> Option<char> {
        self.chars.get(self.pos + k).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn loc(&self, start: usize) -> Location {
        Location {
            code: Rc::clone(&self.code),
            range: start..self.pos,
        }
    }

    fn lexeme(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    /// Consumes a run of whitespace, line continuations, and comments, then
    /// returns the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_blanks_and_continuations();
            match self.peek() {
                Some('#') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }

        let start = self.pos;
        match self.peek() {
            None => Ok(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                location: self.loc(start),
                fd: None,
            }),
            Some('\n') => {
                self.advance();
                Ok(Token {
                    kind: TokenKind::Newline,
                    lexeme: "\n".to_string(),
                    location: self.loc(start),
                    fd: None,
                })
            }
            Some(c) if c.is_ascii_digit() => {
                if let Some(result) = self.try_lex_io_number(start) {
                    result
                } else {
                    self.lex_word(start)
                }
            }
            Some(c) if is_operator_start(c) => self.lex_operator(start),
            _ => self.lex_word(start),
        }
    }

    fn skip_blanks_and_continuations(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') => {
                    self.advance();
                }
                Some('\\') if self.peek_at(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                _ => return,
            }
        }
    }

    fn lex_operator(&mut self, start: usize) -> Result<Token, LexError> {
        for (text, op) in MULTI_CHAR_OPERATORS {
            if self.matches_literal(text) {
                for _ in text.chars() {
                    self.advance();
                }
                return Ok(self.operator_token(start, *op));
            }
        }
        let c = self.advance().expect("caller checked is_operator_start");
        let op = SINGLE_CHAR_OPERATORS
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, op)| *op)
            .expect("is_operator_start matched a known operator character");
        Ok(self.operator_token(start, op))
    }

    fn operator_token(&mut self, start: usize, op: Operator) -> Token {
        Token {
            kind: TokenKind::Operator(op),
            lexeme: self.lexeme(start),
            location: self.loc(start),
            fd: None,
        }
    }

    /// POSIX's `io_number`: a digit sequence is only a file descriptor
    /// number when it immediately (no blanks) precedes a redirection
    /// operator; otherwise it is an ordinary WORD.
    ///
    /// Returns `None` (without consuming anything) if `start` is not
    /// actually the start of such a prefix, so the caller falls back to
    /// lexing a plain word.
    fn try_lex_io_number(&mut self, start: usize) -> Option<Result<Token, LexError>> {
        let mut k = 0;
        while matches!(self.peek_at(k), Some(c) if c.is_ascii_digit()) {
            k += 1;
        }
        let after = self.peek_at(k)?;
        if !is_operator_start(after) {
            return None;
        }
        let saved_pos = self.pos;
        self.pos += k;
        let op_start = self.pos;
        let result = self.lex_operator(op_start);
        match result {
            Ok(mut token) => match token.kind {
                TokenKind::Operator(op) if op.is_redirection() => {
                    let fd: u32 = self.chars[saved_pos..saved_pos + k]
                        .iter()
                        .collect::<String>()
                        .parse()
                        .expect("digit run parses as u32");
                    token.fd = Some(fd);
                    token.location = self.loc(start);
                    token.lexeme = self.lexeme(start);
                    Some(Ok(token))
                }
                _ => {
                    self.pos = saved_pos;
                    None
                }
            },
            Err(_) => {
                self.pos = saved_pos;
                None
            }
        }
    }

    fn matches_literal(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Always produces a `WORD` token, even for text that spells a reserved
    /// word (`if`, `done`, ...): keyword recognition depends on command-start
    /// position, which only the parser knows about.
    fn lex_word(&mut self, start: usize) -> Result<Token, LexError> {
        let units = self.scan_word_units(true)?;
        let lexeme = self.lexeme(start);
        let location = self.loc(start);
        Ok(Token {
            kind: TokenKind::Word(Word { units, location }),
            lexeme,
            location: self.loc(start),
            fd: None,
        })
    }

    /// Scans word units up to a word boundary (`stop_at_boundary`) or, when
    /// parsing a parameter-modifier argument embedded inside `${...}`, up to
    /// the end of the given text (operators have no special meaning there).
    fn scan_word_units(&mut self, stop_at_boundary: bool) -> Result<Vec<WordUnit>, LexError> {
        let start = self.pos;
        let mut units = Vec::new();
        let mut buf = String::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => break,
                Some(c) if stop_at_boundary && !first && is_word_boundary(c) => break,
                Some('\'') => {
                    flush_literal(&mut units, &mut buf);
                    units.push(self.lex_single_quoted()?);
                }
                Some('"') => {
                    flush_literal(&mut units, &mut buf);
                    units.push(self.lex_double_quoted()?);
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        None => return Err(LexError::TrailingBackslash(self.loc(start))),
                        Some('\n') => {}
                        Some(c) => {
                            flush_literal(&mut units, &mut buf);
                            units.push(WordUnit::Unquoted(TextUnit::Backslashed(c)));
                        }
                    }
                }
                Some('$') => {
                    flush_literal(&mut units, &mut buf);
                    if let Some(unit) = self.lex_dollar()? {
                        units.push(WordUnit::Unquoted(unit));
                    } else {
                        buf.push('$');
                    }
                }
                Some('`') => {
                    flush_literal(&mut units, &mut buf);
                    units.push(WordUnit::Unquoted(self.lex_backquote()?));
                }
                Some('~') if first => {
                    flush_literal(&mut units, &mut buf);
                    units.push(self.lex_tilde());
                }
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
            first = false;
        }
        flush_literal(&mut units, &mut buf);
        Ok(units)
    }

    fn lex_single_quoted(&mut self) -> Result<WordUnit, LexError> {
        let quote_start = self.pos;
        self.advance();
        let start = self.pos;
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedSingleQuote(self.loc(quote_start))),
                Some('\'') => break,
                Some(_) => {}
            }
        }
        let content: String = self.chars[start..self.pos - 1].iter().collect();
        Ok(WordUnit::SingleQuoted(content))
    }

    fn lex_double_quoted(&mut self) -> Result<WordUnit, LexError> {
        let quote_start = self.pos;
        self.advance();
        let mut units = Vec::new();
        let mut buf = String::new();
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedDoubleQuote(self.loc(quote_start))),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(c @ ('$' | '"' | '\\' | '`')) => {
                            self.advance();
                            buf.push(c);
                        }
                        Some('\n') => {
                            self.advance();
                        }
                        _ => buf.push('\\'),
                    }
                }
                Some('$') => {
                    flush_text_literal(&mut units, &mut buf);
                    if let Some(unit) = self.lex_dollar()? {
                        units.push(unit);
                    } else {
                        buf.push('$');
                    }
                }
                Some('`') => {
                    flush_text_literal(&mut units, &mut buf);
                    units.push(self.lex_backquote()?);
                }
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
        }
        flush_text_literal(&mut units, &mut buf);
        Ok(WordUnit::DoubleQuoted(units))
    }

    fn lex_tilde(&mut self) -> WordUnit {
        self.advance();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            self.advance();
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        WordUnit::Tilde(name)
    }

    /// Reads a `$...` construct, assuming the cursor is on the `$`.
    ///
    /// Returns `Ok(None)` if the `$` is not followed by anything that forms
    /// a parameter, command, or arithmetic expansion, in which case it is
    /// just a literal `$` and the cursor is left where it was.
    fn lex_dollar(&mut self) -> Result<Option<TextUnit>, LexError> {
        let dollar_start = self.pos;
        self.advance();
        match self.peek() {
            Some('(') if self.peek_at(1) == Some('(') => {
                self.advance();
                self.advance();
                let content = self.scan_balanced_parens(dollar_start, 1)?;
                // Consume the trailing ')' that closes the outer "$((" group;
                // `scan_balanced_parens` already stopped after matching the
                // inner and outer '('.
                if self.peek() == Some(')') {
                    self.advance();
                } else {
                    return Err(LexError::UnterminatedArith(self.loc(dollar_start)));
                }
                Ok(Some(TextUnit::Arith {
                    content,
                    location: self.loc(dollar_start),
                }))
            }
            Some('(') => {
                self.advance();
                let content = self.scan_balanced_parens(dollar_start, 1)?;
                Ok(Some(TextUnit::CommandSubst {
                    content,
                    location: self.loc(dollar_start),
                }))
            }
            Some('{') => {
                self.advance();
                self.lex_braced_param(dollar_start).map(Some)
            }
            Some(c) if is_special_param_char(c) => {
                self.advance();
                Ok(Some(TextUnit::RawParam {
                    name: c.to_string(),
                    location: self.loc(dollar_start),
                }))
            }
            Some(c) if c.is_ascii_digit() => {
                self.advance();
                Ok(Some(TextUnit::RawParam {
                    name: c.to_string(),
                    location: self.loc(dollar_start),
                }))
            }
            Some(c) if is_name_start(c) => {
                let name_start = self.pos;
                while matches!(self.peek(), Some(c) if is_name_continue(c)) {
                    self.advance();
                }
                let name: String = self.chars[name_start..self.pos].iter().collect();
                Ok(Some(TextUnit::RawParam {
                    name,
                    location: self.loc(dollar_start),
                }))
            }
            _ => {
                self.pos = dollar_start;
                self.advance();
                Ok(None)
            }
        }
    }

    /// Consumes characters up to (but not including) the `)` that closes
    /// `depth` nested, already-opened parens, respecting quoting so that
    /// e.g. `$(echo ')')` is handled correctly. Leaves the cursor just after
    /// that closing `)`... except for the arithmetic-expansion double-paren
    /// case, where the caller consumes the final `)` itself.
    fn scan_balanced_parens(&mut self, outer_start: usize, mut depth: u32) -> Result<String, LexError> {
        let content_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedCommandSubst(self.loc(outer_start))),
                Some('\'') => {
                    self.advance();
                    loop {
                        match self.advance() {
                            None => {
                                return Err(LexError::UnterminatedCommandSubst(self.loc(outer_start)))
                            }
                            Some('\'') => break,
                            Some(_) => {}
                        }
                    }
                }
                Some('"') => {
                    self.advance();
                    loop {
                        match self.advance() {
                            None => {
                                return Err(LexError::UnterminatedCommandSubst(self.loc(outer_start)))
                            }
                            Some('\\') => {
                                self.advance();
                            }
                            Some('"') => break,
                            Some(_) => {}
                        }
                    }
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('(') => {
                    self.advance();
                    depth += 1;
                }
                Some(')') => {
                    if depth == 1 {
                        let content: String = self.chars[content_start..self.pos].iter().collect();
                        self.advance();
                        return Ok(content);
                    }
                    self.advance();
                    depth -= 1;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn lex_braced_param(&mut self, dollar_start: usize) -> Result<TextUnit, LexError> {
        let content_start = self.pos;
        let mut depth = 1u32;
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedParam(self.loc(dollar_start))),
                Some('{') => {
                    depth += 1;
                    self.advance();
                }
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    while !matches!(self.peek(), None | Some('\'')) {
                        self.advance();
                    }
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    while !matches!(self.peek(), None | Some('"')) {
                        self.advance();
                    }
                    self.advance();
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let content: String = self.chars[content_start..self.pos].iter().collect();
        self.advance(); // consume '}'

        // `${#name}` (length) is distinguished from a bare special parameter
        // named `#` (`${#}`, `${#-}`, ...) by there being more than just the
        // `#` itself.
        if let Some(rest) = content.strip_prefix('#') {
            if !rest.is_empty() {
                return Ok(TextUnit::BracedParam {
                    name: rest.to_string(),
                    modifier: Modifier::Length,
                    location: self.loc(dollar_start),
                });
            }
        }

        let (name, rest) = split_param_name(&content);
        let modifier = if rest.is_empty() {
            Modifier::None
        } else {
            parse_modifier(rest)
        };
        Ok(TextUnit::BracedParam {
            name,
            modifier,
            location: self.loc(dollar_start),
        })
    }

    fn lex_backquote(&mut self) -> Result<TextUnit, LexError> {
        let start = self.pos;
        self.advance();
        let mut buf = String::new();
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedBackquote(self.loc(start))),
                Some('`') => break,
                Some('\\') => match self.peek() {
                    Some(c @ ('`' | '\\' | '$')) => {
                        self.advance();
                        buf.push(c);
                    }
                    _ => buf.push('\\'),
                },
                Some(c) => buf.push(c),
            }
        }
        Ok(TextUnit::Backquote {
            content: buf,
            location: self.loc(start),
        })
    }
}

fn flush_literal(units: &mut Vec<WordUnit>, buf: &mut String) {
    if !buf.is_empty() {
        units.push(WordUnit::Unquoted(TextUnit::Literal(std::mem::take(buf))));
    }
}

fn flush_text_literal(units: &mut Vec<TextUnit>, buf: &mut String) {
    if !buf.is_empty() {
        units.push(TextUnit::Literal(std::mem::take(buf)));
    }
}

fn is_operator_start(c: char) -> bool {
    matches!(c, '|' | '&' | ';' | '(' | ')' | '<' | '>')
}

fn is_word_boundary(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n' || is_operator_start(c)
}

fn is_special_param_char(c: char) -> bool {
    matches!(c, '@' | '*' | '#' | '?' | '-' | '$' | '!')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits `${name<modop>...}`'s content into the leading parameter name and
/// whatever modifier text follows it.
fn split_param_name(content: &str) -> (String, &str) {
    if let Some(c) = content.chars().next() {
        if is_special_param_char(c) || c.is_ascii_digit() {
            return (c.to_string(), &content[c.len_utf8()..]);
        }
    }
    let end = content
        .char_indices()
        .find(|(_, c)| !is_name_continue(*c))
        .map_or(content.len(), |(i, _)| i);
    (content[..end].to_string(), &content[end..])
}

/// Lexes `text` (a parameter-modifier argument taken from inside `${...}`)
/// as a standalone word. Operators have no meaning here, so this runs to
/// the end of `text` rather than stopping at a word boundary.
fn lex_sub_word(text: &str) -> Word {
    let mut lexer = Lexer::new(text, Source::Unknown);
    let units = lexer
        .scan_word_units(false)
        .unwrap_or_else(|_| vec![WordUnit::Unquoted(TextUnit::Literal(text.to_string()))]);
    Word {
        units,
        location: Location::dummy(text),
    }
}

/// Parses the modifier text following a parameter name inside `${...}`.
fn parse_modifier(rest: &str) -> Modifier {
    let w = lex_sub_word;
    if let Some(arg) = rest.strip_prefix(":-") {
        Modifier::DefaultIfUnsetOrEmpty(w(arg))
    } else if let Some(arg) = rest.strip_prefix(":=") {
        Modifier::AssignIfUnsetOrEmpty(w(arg))
    } else if let Some(arg) = rest.strip_prefix(":?") {
        Modifier::ErrorIfUnsetOrEmpty(w(arg))
    } else if let Some(arg) = rest.strip_prefix(":+") {
        Modifier::AlternateIfNotEmpty(w(arg))
    } else if let Some(arg) = rest.strip_prefix("##") {
        Modifier::RemoveLargestPrefix(w(arg))
    } else if let Some(arg) = rest.strip_prefix('#') {
        Modifier::RemoveSmallestPrefix(w(arg))
    } else if let Some(arg) = rest.strip_prefix("%%") {
        Modifier::RemoveLargestSuffix(w(arg))
    } else if let Some(arg) = rest.strip_prefix('%') {
        Modifier::RemoveSmallestSuffix(w(arg))
    } else if let Some(arg) = rest.strip_prefix("/#") {
        let (pat, repl) = split_once_unescaped(arg, '/');
        Modifier::ReplacePrefix(w(pat), w(repl))
    } else if let Some(arg) = rest.strip_prefix("/%") {
        let (pat, repl) = split_once_unescaped(arg, '/');
        Modifier::ReplaceSuffix(w(pat), w(repl))
    } else if let Some(arg) = rest.strip_prefix("//") {
        let (pat, repl) = split_once_unescaped(arg, '/');
        Modifier::ReplaceAll(w(pat), w(repl))
    } else if let Some(arg) = rest.strip_prefix('/') {
        let (pat, repl) = split_once_unescaped(arg, '/');
        Modifier::ReplaceFirst(w(pat), w(repl))
    } else if rest == "^^" {
        Modifier::UppercaseAll
    } else if rest == "^" {
        Modifier::UppercaseFirst
    } else if rest == ",," {
        Modifier::LowercaseAll
    } else if rest == "," {
        Modifier::LowercaseFirst
    } else {
        Modifier::DefaultIfUnsetOrEmpty(w(rest))
    }
}

fn split_once_unescaped(s: &str, sep: char) -> (&str, &str) {
    match s.split_once(sep) {
        Some((a, b)) => (a, b),
        None => (s, ""),
    }
}
