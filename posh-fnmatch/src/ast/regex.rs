// This file is part of posh, a POSIX-style shell.

//! Conversion to regular expression

use super::*;
use crate::Config;
use crate::Error;
use regex_syntax::ast::ClassAsciiKind;
use std::fmt::Write;

type Result = std::result::Result<(), Error>;

const SPECIAL_CHARS: &str = r"\.+*?()|[]{}^$";
const BRACKET_SPECIAL_CHARS: &str = "-&~";

impl BracketAtom {
    fn fmt_regex_char(c: char, regex: &mut dyn Write) -> Result {
        if BRACKET_SPECIAL_CHARS.contains(c) || SPECIAL_CHARS.contains(c) {
            regex.write_char('\\').unwrap();
        }
        regex.write_char(c).unwrap();
        Ok(())
    }

    fn matches_multi_character(&self) -> bool {
        match self {
            BracketAtom::CollatingSymbol(value) | BracketAtom::EquivalenceClass(value) => {
                value.len() > 1
            }
            _ => false,
        }
    }

    fn fmt_regex(&self, regex: &mut dyn Write) -> Result {
        match self {
            BracketAtom::Char(c) => return BracketAtom::fmt_regex_char(*c, regex),
            BracketAtom::CollatingSymbol(value) | BracketAtom::EquivalenceClass(value) => {
                if !value.is_empty() {
                    regex.write_str(value)
                } else {
                    return Err(Error::EmptyCollatingSymbol);
                }
            }
            BracketAtom::CharClass(class) => {
                if ClassAsciiKind::from_name(class).is_some() {
                    regex.write_fmt(format_args!("[:{class}:]"))
                } else {
                    return Err(Error::UndefinedCharClass(class.clone()));
                }
            }
        }
        .unwrap();
        Ok(())
    }

    fn fmt_regex_single(&self, regex: &mut dyn Write) -> Result {
        match self {
            BracketAtom::Char(c) => BracketAtom::fmt_regex_char(*c, regex),
            BracketAtom::CollatingSymbol(value) | BracketAtom::EquivalenceClass(value) => {
                let c = value.chars().next().ok_or(Error::EmptyCollatingSymbol)?;
                BracketAtom::fmt_regex_char(c, regex)
            }
            BracketAtom::CharClass(class) => Err(Error::CharClassInRange(class.clone())),
        }
    }
}

impl BracketItem {
    fn matches_multi_character(&self) -> bool {
        match self {
            BracketItem::Atom(a) => a.matches_multi_character(),
            BracketItem::Range(_) => false,
        }
    }

    fn fmt_regex(&self, regex: &mut dyn Write) -> Result {
        match self {
            BracketItem::Atom(a) => a.fmt_regex(regex),
            BracketItem::Range(range) => {
                range.start().fmt_regex_single(regex)?;
                regex.write_char('-').unwrap();
                range.end().fmt_regex_single(regex)
            }
        }
    }
}

impl Bracket {
    fn matches_multi_character(&self) -> bool {
        self.items.iter().any(BracketItem::matches_multi_character)
    }

    fn fmt_regex(&self, regex: &mut dyn Write) -> Result {
        if self.items.is_empty() {
            return Err(Error::EmptyBracket);
        }
        if !self.matches_multi_character() {
            regex.write_char('[').unwrap();
            if self.complement {
                regex.write_char('^').unwrap();
            }
            for item in &self.items {
                item.fmt_regex(regex)?;
            }
            regex.write_char(']').unwrap();
        } else if !self.complement {
            regex.write_str("(?:").unwrap();
            let mut first = true;
            for item in &self.items {
                if first {
                    first = false;
                } else {
                    regex.write_char('|').unwrap();
                }

                if !item.matches_multi_character() {
                    regex.write_char('[').unwrap();
                    item.fmt_regex(regex)?;
                    regex.write_char(']').unwrap();
                } else {
                    item.fmt_regex(regex)?;
                }
            }
            regex.write_char(')').unwrap();
        } else {
            regex.write_str("[^").unwrap();
            for item in &self.items {
                if !item.matches_multi_character() {
                    item.fmt_regex(regex)?;
                }
            }
            regex.write_char(']').unwrap();
        }
        Ok(())
    }
}

impl Atom {
    fn fmt_regex(&self, _config: &Config, regex: &mut dyn Write) -> Result {
        match self {
            Atom::Char(c) => {
                if SPECIAL_CHARS.contains(*c) {
                    regex.write_char('\\').unwrap();
                }
                regex.write_char(*c).unwrap();
            }
            Atom::AnyChar => regex.write_char('.').unwrap(),
            Atom::AnyString => regex.write_str(".*").unwrap(),
            Atom::Bracket(bracket) => bracket.fmt_regex(regex)?,
        }
        Ok(())
    }
}

impl Ast {
    /// Writes the AST as a regular expression.
    ///
    /// Only the `anchor_begin` and `anchor_end` options in `config` affect the
    /// results. The other options are ignored.
    pub fn fmt_regex(&self, config: &Config, regex: &mut dyn Write) -> Result {
        if config.anchor_begin {
            regex.write_str(r"\A").unwrap();
        }

        self.atoms
            .iter()
            .try_for_each(|atom| atom.fmt_regex(config, regex))?;

        if config.anchor_end {
            regex.write_str(r"\z").unwrap();
        }

        Ok(())
    }

    /// Converts the AST to a regular expression.
    ///
    /// Only the `anchor_begin` and `anchor_end` options in `config` affect the
    /// results. The other options are ignored.
    pub fn to_regex(&self, config: &Config) -> std::result::Result<String, Error> {
        let mut regex = String::new();
        self.fmt_regex(config, &mut regex)?;
        Ok(regex)
    }
}
