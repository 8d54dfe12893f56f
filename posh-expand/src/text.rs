// This file is part of posh, a POSIX-style shell.

//! Expands a single [`TextUnit`] into characters
//!
//! The one case this module does *not* handle alone is `$@`/`${@}` with no
//! modifier inside a double-quoted word: that needs to split into several
//! output *fields* rather than characters, so [`crate::expand_word`] special
//! cases it directly instead of going through here.

use crate::attr::{push_str, AttrChar};
use crate::command_subst::{strip_trailing_newlines, CommandSubstExecutor};
use crate::error::ExpansionError;
use crate::param::{self, ParamValue};
use posh_env::ShellState;
use posh_syntax::{Modifier, TextUnit};

struct ArithEnv<'a> {
    state: &'a mut ShellState,
}

impl posh_arith::Env for ArithEnv<'_> {
    type AssignVariableError = ExpansionError;

    fn get_variable(&self, name: &str) -> Option<&str> {
        self.state.variable_value(name)
    }

    fn assign_variable(
        &mut self,
        name: &str,
        value: String,
        _location: std::ops::Range<usize>,
    ) -> Result<(), ExpansionError> {
        self.state
            .variables
            .get_or_new(name, posh_env::Scope::Local)
            .assign(value, None)
            .map_err(|_| ExpansionError::CannotAssign {
                name: name.to_string(),
            })
    }
}

/// Expands one text unit, appending to `out`. `quoted` is whether this unit
/// sits inside a quoting context (double quotes); it controls whether the
/// resulting characters are eligible for splitting/globbing downstream.
pub fn expand_text_unit<H: CommandSubstExecutor>(
    unit: &TextUnit,
    quoted: bool,
    state: &mut ShellState,
    host: &mut H,
    out: &mut Vec<AttrChar>,
) -> Result<(), ExpansionError> {
    match unit {
        TextUnit::Literal(s) => push_str(out, s, quoted),
        TextUnit::Backslashed(c) => out.push(AttrChar::quoted(*c)),
        TextUnit::RawParam { name, .. } => {
            expand_param(name, &Modifier::None, quoted, state, host, out)?;
        }
        TextUnit::BracedParam {
            name,
            modifier,
            ..
        } => {
            expand_param(name, modifier, quoted, state, host, out)?;
        }
        TextUnit::CommandSubst { content, .. } | TextUnit::Backquote { content, .. } => {
            let output = host
                .run_capturing_stdout(content)
                .map_err(|e| ExpansionError::CommandSubst {
                    message: e.to_string(),
                })?;
            push_str(out, &strip_trailing_newlines(output), quoted);
        }
        TextUnit::Arith { content, .. } => {
            // Cached on the raw source text; a hit skips re-parsing and
            // re-evaluating entirely, safe because any write that could
            // change the outcome (including an assignment this same
            // expression performs) bumps the generation the cache is keyed
            // on.
            let generation = state.variables.generation();
            let value = match state.cache.cached_arith(content, generation) {
                Some(n) => posh_arith::Value::Integer(n),
                None => {
                    let mut env = ArithEnv { state: &mut *state };
                    let value =
                        posh_arith::eval(content, &mut env).map_err(|e| ExpansionError::Arith {
                            message: e.to_string(),
                        })?;
                    if let posh_arith::Value::Integer(n) = value {
                        state
                            .cache
                            .store_arith(content, state.variables.generation(), n);
                    }
                    value
                }
            };
            push_str(out, &value.to_string(), quoted);
        }
    }
    Ok(())
}

fn expand_param<H: CommandSubstExecutor>(
    name: &str,
    modifier: &Modifier,
    quoted: bool,
    state: &mut ShellState,
    host: &mut H,
    out: &mut Vec<AttrChar>,
) -> Result<(), ExpansionError> {
    if matches!(modifier, Modifier::None) {
        if let ParamValue::Positional(values) = param::lookup(name, state) {
            let joined = param::join_star(&values, state);
            push_str(out, &joined, quoted);
            return Ok(());
        }
    }
    let value = param::expand_scalar(name, state)?;
    let chars = param::apply_modifier(name, value.as_deref(), modifier, state, |w, state| {
        crate::expand_word_scalar(w, state, host)
    })?;
    out.extend(chars.into_iter().map(|mut c| {
        c.quoted = c.quoted || quoted;
        c
    }));
    Ok(())
}
