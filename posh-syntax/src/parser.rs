// This file is part of posh, a POSIX-style shell.

//! Recursive-descent parser that turns a [`TokenStream`] into a [`List`]
//!
//! The grammar follows POSIX shell's own, with two additions: `|&` pipes
//! both stdout and stderr, and `&>` redirects both to a file, in the same
//! places `|` and `>` are allowed. Heredocs (`<<`, `<<-`) are lexed as
//! operators but rejected here with [`Error::Unsupported`]; nothing in this
//! workspace reads heredoc bodies.
//!
//! Keyword recognition happens only here, not in the lexer: a `WORD` token
//! spelled like a reserved word is a keyword exactly when the grammar is
//! looking for one at this exact point (command-start position, the token
//! right after `in`, ...). A case pattern or an ordinary command argument
//! never triggers it, so `echo fi` parses as a command invocation, not a
//! syntax error.

use crate::error::{Error, Expected, ParseError};
use crate::lexer::Lexer;
use crate::source::{Location, Source};
use crate::stream::TokenStream;
use crate::syntax::*;
use crate::token::{Keyword, Operator, Token, TokenKind};
use std::rc::Rc;

/// Result of a resumable parse attempt.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The accumulated input parses as a complete program.
    Complete(List),
    /// The accumulated input ends mid-construct; feed more and try again.
    NeedsMore,
}

/// A parser over one [`TokenStream`].
///
/// [`Parser::feed_chunk`] re-parses the whole accumulated token buffer from
/// the start on every call rather than resuming a suspended grammar rule.
/// Nothing is re-lexed (tokens already produced stay cached in the
/// [`TokenStream`]), so the cost of a retry is proportional to how much has
/// been typed, not to how much history exists; and the result is always
/// exactly what a single-shot parse of the same accumulated text would
/// produce, by construction.
pub struct Parser {
    stream: TokenStream,
    errors: Vec<Error>,
}

impl Parser {
    #[must_use]
    pub fn new(lexer: Lexer) -> Self {
        Parser {
            stream: TokenStream::new(lexer),
            errors: Vec::new(),
        }
    }

    /// Parses `text` as a complete, self-contained program.
    ///
    /// An unfinished construct (an `if` with no `then`, an open `{`, ...) is
    /// reported as [`Error::IncompleteInput`] rather than a generic syntax
    /// error, so a caller can tell "this will never parse" apart from "this
    /// would parse given more input".
    pub fn parse_complete(text: &str, source: Source) -> Result<List, Error> {
        let mut parser = Parser::new(Lexer::new(text, source));
        parser.parse_program()
    }

    /// Like [`Parser::parse_complete`], but returns every recovered syntax
    /// error alongside the partial tree instead of stopping at the first
    /// one.
    pub fn parse_complete_lenient(text: &str, source: Source) -> Result<(List, Vec<Error>), Error> {
        let mut parser = Parser::new(Lexer::new(text, source));
        let list = parser.parse_program_allowing_errors()?;
        Ok((list, parser.errors))
    }

    fn parse_program(&mut self) -> Result<List, Error> {
        let list = self.parse_program_allowing_errors()?;
        if let Some(e) = self.errors.first() {
            return Err(e.clone());
        }
        Ok(list)
    }

    fn parse_program_allowing_errors(&mut self) -> Result<List, Error> {
        match self.parse_list(&|t| matches!(t.kind, TokenKind::Eof)) {
            Ok(list) => Ok(list),
            Err(Error::NeedsMore(loc)) => Err(Error::IncompleteInput(loc)),
            Err(e) => Err(e),
        }
    }

    /// Feeds another chunk of input (typically one line read interactively)
    /// and reports whether the input accumulated so far is a complete
    /// program yet.
    ///
    /// On [`ParseOutcome::Complete`], the parser's internal state is reset
    /// so the next call starts a fresh program.
    pub fn feed_chunk(&mut self, text: &str) -> Result<ParseOutcome, Error> {
        self.stream.feed(text);
        self.stream.reset(0);
        self.errors.clear();
        match self.parse_list(&|t| matches!(t.kind, TokenKind::Eof)) {
            Ok(list) => {
                if let Some(e) = self.errors.first().cloned() {
                    Err(e)
                } else {
                    Ok(ParseOutcome::Complete(list))
                }
            }
            // A lexer-level unterminated quote/subst/paren is exactly
            // "needs more" in resumable mode, not a hard error.
            Err(Error::NeedsMore(_) | Error::Lex(_)) => Ok(ParseOutcome::NeedsMore),
            Err(e) => Err(e),
        }
    }

    // ---- list / and-or / pipeline --------------------------------------

    fn parse_list(&mut self, stop: &dyn Fn(&Token) -> bool) -> Result<List, Error> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines()?;
            let t = self.stream.peek(0)?.clone();
            if matches!(t.kind, TokenKind::Eof) || stop(&t) {
                break;
            }
            match self.parse_and_or() {
                Ok(and_or) => {
                    let next = self.stream.peek(0)?.clone();
                    let terminator = match &next.kind {
                        TokenKind::Operator(Operator::Semicolon) => {
                            self.stream.consume()?;
                            Terminator::Sequential
                        }
                        TokenKind::Operator(Operator::Amp) => {
                            self.stream.consume()?;
                            Terminator::Background
                        }
                        TokenKind::Newline => {
                            self.stream.consume()?;
                            Terminator::Sequential
                        }
                        _ => Terminator::Sequential,
                    };
                    items.push(Item { and_or, terminator });
                    let t2 = self.stream.peek(0)?.clone();
                    if matches!(t2.kind, TokenKind::Eof) || stop(&t2) {
                        break;
                    }
                }
                // An open construct propagates straight out: recovering
                // from it would just desync further on every later line.
                Err(Error::NeedsMore(loc)) => return Err(Error::NeedsMore(loc)),
                Err(e) => {
                    self.errors.push(e);
                    self.stream.mark_error();
                    self.stream.recover()?;
                    let t3 = self.stream.peek(0)?.clone();
                    if matches!(
                        t3.kind,
                        TokenKind::Operator(Operator::Semicolon) | TokenKind::Newline
                    ) {
                        self.stream.consume()?;
                    }
                }
            }
        }
        Ok(List { items })
    }

    fn parse_and_or(&mut self) -> Result<AndOrList, Error> {
        let location = self.stream.position()?;
        let first = self.parse_pipeline()?;
        let mut rest = Vec::new();
        loop {
            let t = self.stream.peek(0)?.clone();
            let connector = match &t.kind {
                TokenKind::Operator(Operator::AndAnd) => Connector::And,
                TokenKind::Operator(Operator::OrOr) => Connector::Or,
                _ => break,
            };
            self.stream.consume()?;
            self.skip_newlines()?;
            let next = self.parse_pipeline()?;
            rest.push((connector, next));
        }
        Ok(AndOrList { first, rest, location })
    }

    fn parse_pipeline(&mut self) -> Result<Pipeline, Error> {
        let location = self.stream.position()?;
        let mut negated = false;
        if self.at_plain_keyword(Keyword::Bang)? {
            self.stream.consume()?;
            negated = true;
        }
        let mut commands = vec![self.parse_command()?];
        loop {
            let t = self.stream.peek(0)?.clone();
            let is_pipe = matches!(
                t.kind,
                TokenKind::Operator(Operator::Pipe) | TokenKind::Operator(Operator::PipeAmp)
            );
            if !is_pipe {
                break;
            }
            self.stream.consume()?;
            self.skip_newlines()?;
            commands.push(self.parse_command()?);
        }
        Ok(Pipeline {
            negated,
            commands,
            location,
        })
    }

    // ---- commands --------------------------------------------------------

    fn parse_command(&mut self) -> Result<Command, Error> {
        if self.at_plain_keyword(Keyword::Function)? {
            return Ok(Command::Function(self.parse_function_def_with_keyword()?));
        }
        if self.is_compound_command_start()? {
            let location = self.stream.position()?;
            let command = self.parse_compound_command()?;
            let redirections = self.parse_redirections()?;
            return Ok(Command::Compound {
                command,
                redirections,
                location,
            });
        }
        if self.is_function_def_start()? {
            return Ok(Command::Function(self.parse_function_def_name_form()?));
        }
        Ok(Command::Simple(self.parse_simple_command()?))
    }

    fn is_compound_command_start(&mut self) -> Result<bool, Error> {
        let t = self.stream.peek(0)?.clone();
        if matches!(t.kind, TokenKind::Operator(Operator::OpenParen)) {
            return Ok(true);
        }
        Ok(matches!(
            t.as_plain_str().and_then(Keyword::parse),
            Some(
                Keyword::If
                    | Keyword::While
                    | Keyword::Until
                    | Keyword::For
                    | Keyword::Case
                    | Keyword::OpenBrace
            )
        ))
    }

    /// `name ( )` with no `function` keyword: a function definition only if
    /// followed by a compound command body (checked by the caller before it
    /// commits to this production).
    fn is_function_def_start(&mut self) -> Result<bool, Error> {
        let a = self.stream.peek(0)?.clone();
        if !matches!(a.kind, TokenKind::Word(_)) {
            return Ok(false);
        }
        let b = self.stream.peek(1)?.clone();
        if !matches!(b.kind, TokenKind::Operator(Operator::OpenParen)) {
            return Ok(false);
        }
        let c = self.stream.peek(2)?.clone();
        Ok(matches!(c.kind, TokenKind::Operator(Operator::CloseParen)))
    }

    fn parse_compound_command(&mut self) -> Result<CompoundCommand, Error> {
        let t = self.stream.peek(0)?.clone();
        if matches!(t.kind, TokenKind::Operator(Operator::OpenParen)) {
            return self.parse_subshell();
        }
        match t.as_plain_str().and_then(Keyword::parse) {
            Some(Keyword::If) => self.parse_if_clause(),
            Some(Keyword::While) => self.parse_loop_clause(false),
            Some(Keyword::Until) => self.parse_loop_clause(true),
            Some(Keyword::For) => self.parse_for_clause(),
            Some(Keyword::Case) => self.parse_case_clause(),
            Some(Keyword::OpenBrace) => self.parse_brace_group(),
            _ => Err(self.syntax_err(Expected::CompoundCommandBody, &t)),
        }
    }

    fn parse_subshell(&mut self) -> Result<CompoundCommand, Error> {
        self.expect_operator(Operator::OpenParen)?;
        let list = self.parse_list(&|t| matches!(t.kind, TokenKind::Operator(Operator::CloseParen)))?;
        self.expect_operator(Operator::CloseParen)?;
        Ok(CompoundCommand::Subshell(list))
    }

    fn parse_brace_group(&mut self) -> Result<CompoundCommand, Error> {
        self.expect_keyword(Keyword::OpenBrace)?;
        let list = self.parse_list(&|t| t.as_plain_str() == Some(Keyword::CloseBrace.as_str()))?;
        self.expect_keyword(Keyword::CloseBrace)?;
        Ok(CompoundCommand::Brace(list))
    }

    fn parse_if_clause(&mut self) -> Result<CompoundCommand, Error> {
        let kw = self.expect_keyword(Keyword::If)?;
        let condition = self.parse_list(&|t| t.as_plain_str() == Some(Keyword::Then.as_str()))?;
        self.expect_keyword(Keyword::Then)?;
        let body = self.parse_list(&is_if_body_terminator)?;

        let mut elifs = Vec::new();
        while self.at_plain_keyword(Keyword::Elif)? {
            self.stream.consume()?;
            let elif_condition = self.parse_list(&|t| t.as_plain_str() == Some(Keyword::Then.as_str()))?;
            self.expect_keyword(Keyword::Then)?;
            let elif_body = self.parse_list(&is_if_body_terminator)?;
            elifs.push((elif_condition, elif_body));
        }

        let else_branch = if self.at_plain_keyword(Keyword::Else)? {
            self.stream.consume()?;
            Some(self.parse_list(&|t| t.as_plain_str() == Some(Keyword::Fi.as_str()))?)
        } else {
            None
        };

        self.expect_keyword(Keyword::Fi)?;
        Ok(CompoundCommand::If(IfClause {
            condition,
            body,
            elifs,
            else_branch,
            location: kw.location,
        }))
    }

    fn parse_loop_clause(&mut self, until: bool) -> Result<CompoundCommand, Error> {
        let kw = if until {
            self.expect_keyword(Keyword::Until)?
        } else {
            self.expect_keyword(Keyword::While)?
        };
        let condition = self.parse_list(&|t| t.as_plain_str() == Some(Keyword::Do.as_str()))?;
        self.expect_keyword(Keyword::Do)?;
        let body = self.parse_list(&|t| t.as_plain_str() == Some(Keyword::Done.as_str()))?;
        self.expect_keyword(Keyword::Done)?;
        Ok(CompoundCommand::While(LoopClause {
            condition,
            body,
            negate_condition: until,
            location: kw.location,
        }))
    }

    fn parse_for_clause(&mut self) -> Result<CompoundCommand, Error> {
        let kw = self.expect_keyword(Keyword::For)?;
        let name_tok = self.stream.peek(0)?.clone();
        let name = name_tok
            .as_plain_str()
            .map(str::to_string)
            .ok_or_else(|| self.syntax_err(Expected::Name, &name_tok))?;
        self.stream.consume()?;
        self.skip_newlines()?;

        let words = if self.at_plain_keyword(Keyword::In)? {
            self.stream.consume()?;
            let mut words = Vec::new();
            while matches!(self.stream.peek(0)?.kind, TokenKind::Word(_)) {
                words.push(self.parse_word_token()?);
            }
            self.consume_sequential_separator()?;
            Some(words)
        } else {
            if matches!(self.stream.peek(0)?.kind, TokenKind::Operator(Operator::Semicolon)) {
                self.stream.consume()?;
            }
            None
        };

        self.skip_newlines()?;
        self.expect_keyword(Keyword::Do)?;
        let body = self.parse_list(&|t| t.as_plain_str() == Some(Keyword::Done.as_str()))?;
        self.expect_keyword(Keyword::Done)?;
        Ok(CompoundCommand::For(ForClause {
            name,
            words,
            body,
            location: kw.location,
        }))
    }

    fn consume_sequential_separator(&mut self) -> Result<(), Error> {
        let t = self.stream.peek(0)?.clone();
        match &t.kind {
            TokenKind::Operator(Operator::Semicolon) | TokenKind::Newline => {
                self.stream.consume()?;
            }
            TokenKind::Eof => return Err(Error::NeedsMore(t.location)),
            _ => return Err(self.syntax_err(Expected::Operator(Operator::Semicolon), &t)),
        }
        self.skip_newlines()
    }

    fn parse_case_clause(&mut self) -> Result<CompoundCommand, Error> {
        let kw = self.expect_keyword(Keyword::Case)?;
        let subject = self.parse_word_token()?;
        self.skip_newlines()?;
        self.expect_keyword(Keyword::In)?;
        self.skip_newlines()?;

        let mut items = Vec::new();
        while !self.at_plain_keyword(Keyword::Esac)? {
            let item_location = self.stream.position()?;
            self.stream
                .match_if(|t| matches!(t.kind, TokenKind::Operator(Operator::OpenParen)))?;

            let mut patterns = vec![self.parse_word_token()?];
            while matches!(self.stream.peek(0)?.kind, TokenKind::Operator(Operator::Pipe)) {
                self.stream.consume()?;
                patterns.push(self.parse_word_token()?);
            }
            self.expect_operator(Operator::CloseParen)?;
            self.skip_newlines()?;

            let body = self.parse_list(&|t| {
                matches!(t.kind, TokenKind::Operator(Operator::DSemicolon))
                    || t.as_plain_str() == Some(Keyword::Esac.as_str())
            })?;
            if matches!(self.stream.peek(0)?.kind, TokenKind::Operator(Operator::DSemicolon)) {
                self.stream.consume()?;
                self.skip_newlines()?;
            }
            items.push(CaseItem {
                patterns,
                body,
                location: item_location,
            });
        }

        self.expect_keyword(Keyword::Esac)?;
        Ok(CompoundCommand::Case(CaseClause {
            subject,
            items,
            location: kw.location,
        }))
    }

    fn parse_function_def_with_keyword(&mut self) -> Result<FunctionDef, Error> {
        let kw = self.expect_keyword(Keyword::Function)?;
        let name_tok = self.stream.peek(0)?.clone();
        let name = name_tok
            .as_plain_str()
            .map(str::to_string)
            .ok_or_else(|| self.syntax_err(Expected::Name, &name_tok))?;
        self.stream.consume()?;
        if matches!(self.stream.peek(0)?.kind, TokenKind::Operator(Operator::OpenParen)) {
            self.stream.consume()?;
            self.expect_operator(Operator::CloseParen)?;
        }
        self.skip_newlines()?;
        let body = self.parse_compound_command_body()?;
        Ok(FunctionDef {
            name,
            body: Rc::new(body),
            location: kw.location,
        })
    }

    fn parse_function_def_name_form(&mut self) -> Result<FunctionDef, Error> {
        let name_tok = self.stream.consume()?;
        let name = name_tok
            .as_plain_str()
            .map(str::to_string)
            .ok_or_else(|| self.syntax_err(Expected::Name, &name_tok))?;
        self.stream.consume()?; // '('
        self.stream.consume()?; // ')'
        self.skip_newlines()?;
        let body = self.parse_compound_command_body()?;
        Ok(FunctionDef {
            name,
            body: Rc::new(body),
            location: name_tok.location,
        })
    }

    /// A function body must itself be a compound command; reusing
    /// `parse_command` gives it the same redirection-collection behavior as
    /// any other compound command (`f() { :; } >log`).
    fn parse_compound_command_body(&mut self) -> Result<Command, Error> {
        let t = self.stream.peek(0)?.clone();
        if !self.is_compound_command_start()? {
            return Err(self.syntax_err(Expected::CompoundCommandBody, &t));
        }
        self.parse_command()
    }

    // ---- simple commands and redirections ---------------------------------

    fn parse_simple_command(&mut self) -> Result<SimpleCommand, Error> {
        let location = self.stream.position()?;
        let mut assignments = Vec::new();
        let mut words = Vec::new();
        let mut redirections = Vec::new();
        loop {
            let t = self.stream.peek(0)?.clone();
            match &t.kind {
                TokenKind::Word(w) if words.is_empty() && assignment_name_len(w).is_some() => {
                    let w = w.clone();
                    self.stream.consume()?;
                    let (name, value) = split_assignment(&w);
                    assignments.push(Assignment {
                        name,
                        value,
                        location: t.location,
                    });
                }
                TokenKind::Word(w) => {
                    let w = w.clone();
                    self.stream.consume()?;
                    words.push(w);
                }
                TokenKind::Operator(op) if op.is_redirection() => {
                    if let Some(r) = self.try_parse_redirection()? {
                        redirections.push(r);
                    }
                }
                _ => break,
            }
        }
        if assignments.is_empty() && words.is_empty() && redirections.is_empty() {
            let t = self.stream.peek(0)?.clone();
            return Err(self.syntax_err(Expected::Word, &t));
        }
        Ok(SimpleCommand {
            assignments,
            words,
            redirections,
            location,
        })
    }

    fn parse_redirections(&mut self) -> Result<Vec<Redirection>, Error> {
        let mut redirs = Vec::new();
        while let Some(r) = self.try_parse_redirection()? {
            redirs.push(r);
        }
        Ok(redirs)
    }

    fn try_parse_redirection(&mut self) -> Result<Option<Redirection>, Error> {
        let t = self.stream.peek(0)?.clone();
        let op = match &t.kind {
            TokenKind::Operator(op) if op.is_redirection() => *op,
            _ => return Ok(None),
        };
        if matches!(op, Operator::DLess | Operator::DLessDash) {
            return Err(Error::Unsupported(t.location));
        }
        let redir_op = match op {
            Operator::Less => RedirOp::FileIn,
            Operator::Great => RedirOp::FileOut,
            Operator::DGreat => RedirOp::Append,
            Operator::LessAmp => RedirOp::DupIn,
            Operator::GreatAmp => RedirOp::DupOut,
            Operator::AmpGreat => RedirOp::FileOutErr,
            _ => unreachable!("DLess/DLessDash rejected above"),
        };
        let fd = t.fd.unwrap_or_else(|| redir_op.default_fd());
        self.stream.consume()?;
        let target = self.parse_redirection_target()?;
        Ok(Some(Redirection {
            fd,
            op: redir_op,
            target,
            location: t.location,
        }))
    }

    fn parse_redirection_target(&mut self) -> Result<Word, Error> {
        let t = self.stream.peek(0)?.clone();
        match &t.kind {
            TokenKind::Eof => Err(Error::NeedsMore(t.location)),
            TokenKind::Word(w) => {
                let w = w.clone();
                self.stream.consume()?;
                Ok(w)
            }
            _ => Err(self.syntax_err(Expected::RedirectionTarget, &t)),
        }
    }

    fn parse_word_token(&mut self) -> Result<Word, Error> {
        let t = self.stream.peek(0)?.clone();
        match &t.kind {
            TokenKind::Eof => Err(Error::NeedsMore(t.location)),
            TokenKind::Word(w) => {
                let w = w.clone();
                self.stream.consume()?;
                Ok(w)
            }
            _ => Err(self.syntax_err(Expected::Word, &t)),
        }
    }

    // ---- small helpers -----------------------------------------------------

    fn skip_newlines(&mut self) -> Result<(), Error> {
        while matches!(self.stream.peek(0)?.kind, TokenKind::Newline) {
            self.stream.consume()?;
        }
        Ok(())
    }

    fn at_plain_keyword(&mut self, kw: Keyword) -> Result<bool, Error> {
        Ok(self.stream.peek(0)?.as_plain_str() == Some(kw.as_str()))
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<Token, Error> {
        let t = self.stream.peek(0)?.clone();
        if matches!(t.kind, TokenKind::Eof) {
            return Err(Error::NeedsMore(t.location));
        }
        if t.as_plain_str() == Some(kw.as_str()) {
            Ok(self.stream.consume()?)
        } else {
            Err(self.syntax_err(Expected::Keyword(kw), &t))
        }
    }

    fn expect_operator(&mut self, op: Operator) -> Result<Token, Error> {
        let t = self.stream.peek(0)?.clone();
        if matches!(t.kind, TokenKind::Eof) {
            return Err(Error::NeedsMore(t.location));
        }
        match &t.kind {
            TokenKind::Operator(o) if *o == op => Ok(self.stream.consume()?),
            _ => Err(self.syntax_err(Expected::Operator(op), &t)),
        }
    }

    fn syntax_err(&self, expected: Expected, t: &Token) -> Error {
        Error::Syntax(ParseError {
            expected,
            found: describe(t),
            location: t.location.clone(),
        })
    }
}

fn is_if_body_terminator(t: &Token) -> bool {
    matches!(t.as_plain_str(), Some(s) if [Keyword::Elif, Keyword::Else, Keyword::Fi]
        .iter()
        .any(|k| k.as_str() == s))
}

fn describe(t: &Token) -> String {
    match &t.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Newline => "a newline".to_string(),
        TokenKind::Operator(op) => format!("`{}`", op.as_str()),
        TokenKind::Word(_) => format!("`{}`", t.lexeme),
    }
}

/// If `w` starts with `name=`, unquoted and literal, returns the byte length
/// of `name=` within the first unit. A quoted or expansion-led prefix (e.g.
/// `"FOO"=bar`, `$x=y`) never counts as an assignment.
fn assignment_name_len(w: &Word) -> Option<usize> {
    let WordUnit::Unquoted(TextUnit::Literal(s)) = w.units.first()? else {
        return None;
    };
    let eq = s.find('=')?;
    let name = &s[..eq];
    if name.is_empty() || !is_valid_name(name) {
        return None;
    }
    Some(eq + 1)
}

fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn split_assignment(w: &Word) -> (String, Word) {
    let WordUnit::Unquoted(TextUnit::Literal(s)) = &w.units[0] else {
        unreachable!("checked by assignment_name_len")
    };
    let eq = s.find('=').expect("checked by assignment_name_len");
    let name = s[..eq].to_string();
    let rest = s[eq + 1..].to_string();
    let mut units = Vec::with_capacity(w.units.len());
    if !rest.is_empty() {
        units.push(WordUnit::Unquoted(TextUnit::Literal(rest)));
    }
    units.extend(w.units[1..].iter().cloned());
    let value = Word {
        units,
        location: w.location.clone(),
    };
    (name, value)
}
