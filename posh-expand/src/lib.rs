// This file is part of posh, a POSIX-style shell.

//! Word expansion
//!
//! [`expand_word`] is the main entry point: it runs a [`Word`] through brace
//! expansion, tilde expansion, parameter/command/arithmetic substitution,
//! field splitting and pathname expansion, in that order, and returns the
//! resulting argv-ready strings. [`expand_word_scalar`] is the restricted
//! entry point for contexts that forbid splitting and globbing (an
//! assignment's right-hand side, a `case` subject, a modifier's own operand
//! word).
//!
//! Characters are carried through the pipeline as [`attr::AttrChar`], which
//! remembers whether each one came from quoted source text; that's what
//! lets splitting and globbing skip quoted separators and metacharacters,
//! the same per-character bookkeeping `yash-semantics`'s own expansion
//! module does with its `AttrChar`/`Origin` types.

pub mod attr;
pub mod brace;
pub mod command_subst;
pub mod error;
pub mod glob;
pub mod param;
pub mod split;
mod text;

use attr::AttrChar;
use command_subst::CommandSubstExecutor;
use error::ExpansionError;
use posh_env::ShellState;
use posh_syntax::{TextUnit, Word, WordUnit};

/// Expands a word in a context that allows splitting and pathname expansion
/// (command words and arguments, `for`-loop word lists, redirection
/// operands are also run through this though redirection targets should
/// resolve to exactly one field; the caller is responsible for rejecting a
/// multi-field result there).
pub fn expand_word<H: CommandSubstExecutor>(
    word: &Word,
    state: &mut ShellState,
    host: &mut H,
) -> Result<Vec<String>, ExpansionError> {
    let mut results = Vec::new();
    for braced in brace::brace_expand(word) {
        let fields = expand_fields(&braced, state, host)?;
        for field in fields {
            match glob::expand(&field) {
                Some(matches) if !matches.is_empty() => results.extend(matches),
                Some(_) => results.push(attr::to_plain_string(&field)),
                None => results.push(attr::to_plain_string(&field)),
            }
        }
    }
    Ok(results)
}

/// Expands a word in a context that forbids splitting and globbing
/// (assignment right-hand sides, `case` subjects, a parameter modifier's own
/// operand word). Always yields exactly one string.
pub fn expand_word_scalar<H: CommandSubstExecutor>(
    word: &Word,
    state: &mut ShellState,
    host: &mut H,
) -> Result<String, ExpansionError> {
    Ok(attr::to_plain_string(&expand_word_attr_chars(
        word, state, host,
    )?))
}

/// Like [`expand_word_scalar`], but keeps each character's quote provenance
/// instead of flattening to a plain string. `case` pattern subjects and
/// patterns need this: a quoted glob metacharacter in a pattern must match
/// itself literally rather than act as a wildcard.
pub fn expand_word_attr_chars<H: CommandSubstExecutor>(
    word: &Word,
    state: &mut ShellState,
    host: &mut H,
) -> Result<Vec<AttrChar>, ExpansionError> {
    let mut out = Vec::new();
    for unit in &word.units {
        expand_unit(unit, state, host, &mut out)?;
    }
    Ok(out)
}

/// Splits a word into fields (parameter/command/arithmetic expansion plus
/// `IFS` splitting) without pathname expansion, for contexts like a `for`
/// clause's word list evaluated without glob (not used by the default
/// pipeline, but kept as a building block alongside [`expand_word`]).
fn expand_fields<H: CommandSubstExecutor>(
    word: &Word,
    state: &mut ShellState,
    host: &mut H,
) -> Result<Vec<Vec<AttrChar>>, ExpansionError> {
    let mut fields: Vec<Vec<AttrChar>> = vec![Vec::new()];
    let fully_unquoted = matches!(word.quote_provenance(), posh_syntax::QuoteProvenance::Unquoted);

    for unit in &word.units {
        match unit {
            WordUnit::DoubleQuoted(text_units) => {
                expand_double_quoted(text_units, state, host, &mut fields)?;
            }
            other => {
                expand_unit(other, state, host, fields.last_mut().unwrap())?;
            }
        }
    }

    let mut split_fields = Vec::new();
    for field in fields {
        split_fields.extend(split::split(&field, state));
    }

    if fully_unquoted && split_fields.len() == 1 && split_fields[0].is_empty() {
        return Ok(Vec::new());
    }

    Ok(split_fields)
}

fn expand_unit<H: CommandSubstExecutor>(
    unit: &WordUnit,
    state: &mut ShellState,
    host: &mut H,
    out: &mut Vec<AttrChar>,
) -> Result<(), ExpansionError> {
    match unit {
        WordUnit::Unquoted(text_unit) => text::expand_text_unit(text_unit, false, state, host, out)?,
        WordUnit::SingleQuoted(s) => attr::push_str(out, s, true),
        WordUnit::DoubleQuoted(text_units) => {
            for text_unit in text_units {
                text::expand_text_unit(text_unit, true, state, host, out)?;
            }
        }
        WordUnit::Tilde(prefix) => attr::push_str(out, &glob::expand_tilde(prefix), false),
    }
    Ok(())
}

/// Handles a double-quoted segment, special-casing an unmodified `$@`/`${@}`
/// reference so it breaks into one field per positional parameter instead
/// of joining them, the one place plain character-level expansion isn't
/// enough.
fn expand_double_quoted<H: CommandSubstExecutor>(
    text_units: &[TextUnit],
    state: &mut ShellState,
    host: &mut H,
    fields: &mut Vec<Vec<AttrChar>>,
) -> Result<(), ExpansionError> {
    for text_unit in text_units {
        if is_unmodified_at_sign(text_unit) {
            let values = state.positional_params().to_vec();
            let mut values = values.into_iter();
            match values.next() {
                None => {}
                Some(first) => {
                    attr::push_str(fields.last_mut().unwrap(), &first, true);
                    for rest in values {
                        fields.push(Vec::new());
                        attr::push_str(fields.last_mut().unwrap(), &rest, true);
                    }
                }
            }
            continue;
        }
        text::expand_text_unit(text_unit, true, state, host, fields.last_mut().unwrap())?;
    }
    Ok(())
}

fn is_unmodified_at_sign(unit: &TextUnit) -> bool {
    matches!(unit, TextUnit::RawParam { name, .. } if name == "@")
}
