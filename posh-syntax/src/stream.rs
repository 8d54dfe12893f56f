// This file is part of posh, a POSIX-style shell.

//! Cursor over a token sequence, the sole token accessor for grammar rules

use crate::lexer::{LexError, Lexer};
use crate::token::{Keyword, Operator, Token, TokenKind};

/// Tokens the parser synchronizes on after a syntax error
pub const RECOVERY_TOKENS: &[RecoveryToken] = &[
    RecoveryToken::Operator(Operator::Semicolon),
    RecoveryToken::Newline,
    RecoveryToken::Keyword(Keyword::Fi),
    RecoveryToken::Keyword(Keyword::Done),
    RecoveryToken::Keyword(Keyword::Esac),
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecoveryToken {
    Operator(Operator),
    Keyword(Keyword),
    Newline,
}

/// A buffered, peekable cursor over a [`Lexer`]'s output
///
/// Tokens are pulled from the lexer lazily and cached; the cursor only ever
/// advances an index into that cache rather than discarding entries, so a
/// resumable parse can [`reset`](Self::reset) to the start and retry over
/// already-lexed tokens without re-running the lexer.
pub struct TokenStream {
    lexer: Lexer,
    buffer: Vec<Token>,
    pos: usize,
    /// Set once a lex error has been observed, so the parser can stop asking
    /// for more tokens and report it instead of looping.
    pending_error: Option<LexError>,
    error_seen: bool,
}

impl TokenStream {
    #[must_use]
    pub fn new(lexer: Lexer) -> Self {
        TokenStream {
            lexer,
            buffer: Vec::new(),
            pos: 0,
            pending_error: None,
            error_seen: false,
        }
    }

    /// Feeds more source text to the underlying lexer, for resumable parsing.
    ///
    /// Drops any `EOF` tokens already cached at the tail of the buffer: they
    /// were only ever "the lexer has nothing left to say yet", and now it
    /// does.
    pub fn feed(&mut self, more: &str) {
        self.lexer.feed(more);
        self.pending_error = None;
        while matches!(self.buffer.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            self.buffer.pop();
        }
    }

    /// Returns the current cursor position, for later [`reset`](Self::reset).
    #[must_use]
    pub fn mark(&self) -> usize {
        self.pos
    }

    /// Rewinds the cursor to a position returned by [`mark`](Self::mark),
    /// without discarding any already-lexed tokens.
    pub fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn fill(&mut self, upto: usize) -> Result<(), LexError> {
        let target = self.pos + upto;
        while self.buffer.len() <= target {
            if let Some(e) = self.pending_error.clone() {
                return Err(e);
            }
            match self.lexer.next_token() {
                Ok(t) => {
                    let is_eof = matches!(t.kind, TokenKind::Eof);
                    self.buffer.push(t);
                    if is_eof {
                        // EOF repeats forever once reached.
                        while self.buffer.len() <= target {
                            self.buffer.push(self.buffer.last().unwrap().clone());
                        }
                    }
                }
                Err(e) => {
                    self.pending_error = Some(e.clone());
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Looks at the token `k` positions ahead without consuming it.
    pub fn peek(&mut self, k: usize) -> Result<&Token, LexError> {
        self.fill(k)?;
        Ok(&self.buffer[self.pos + k])
    }

    /// Consumes and returns the next token.
    pub fn consume(&mut self) -> Result<Token, LexError> {
        self.fill(0)?;
        let t = self.buffer[self.pos].clone();
        self.pos += 1;
        Ok(t)
    }

    /// Consumes the next token if it matches `pred`.
    pub fn match_if(&mut self, pred: impl FnOnce(&Token) -> bool) -> Result<Option<Token>, LexError> {
        if pred(self.peek(0)?) {
            Ok(Some(self.consume()?))
        } else {
            Ok(None)
        }
    }

    /// Returns the location of the upcoming token, for error reporting.
    pub fn position(&mut self) -> Result<crate::source::Location, LexError> {
        Ok(self.peek(0)?.location.clone())
    }

    /// Marks that a syntax error has been observed; subsequent
    /// [`TokenStream::recover`] calls know to skip to a synchronization
    /// point.
    pub fn mark_error(&mut self) {
        self.error_seen = true;
    }

    #[must_use]
    pub fn had_error(&self) -> bool {
        self.error_seen
    }

    /// Advances past tokens until a [recovery point](RECOVERY_TOKENS) or EOF.
    ///
    /// Every reserved word arrives as a plain `WORD` token (the lexer never
    /// tags one as a keyword; only the parser reclassifies), so recovery
    /// recognizes `fi`/`done`/`esac` by their plain unquoted spelling.
    pub fn recover(&mut self) -> Result<(), LexError> {
        loop {
            let at_recovery = {
                let t = self.peek(0)?;
                let plain = t.as_plain_str();
                matches!(t.kind, TokenKind::Eof | TokenKind::Newline)
                    || RECOVERY_TOKENS.iter().any(|r| match r {
                        RecoveryToken::Operator(a) => {
                            matches!(&t.kind, TokenKind::Operator(b) if a == b)
                        }
                        RecoveryToken::Keyword(a) => plain == Some(a.as_str()),
                        RecoveryToken::Newline => matches!(t.kind, TokenKind::Newline),
                    })
            };
            if at_recovery {
                return Ok(());
            }
            self.consume()?;
        }
    }
}
