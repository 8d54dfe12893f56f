// This file is part of posh, a POSIX-style shell.

//! Parameter lookup and modifier application
//!
//! Grounded on the modifier table `yash-semantics`'s expansion module
//! implements (`${name:-word}` and friends) and on `posh-fnmatch` for
//! the glob-pattern modifiers (`#`, `##`, `%`, `%%`, `/`, `//`). Nested
//! parameter expansion inside a modifier's own operand word is not attempted
//! here: only a single level of modifier nesting is supported, matching this
//! workspace's resolution of that open question.

use crate::attr::{push_str, to_plain_string, AttrChar};
use crate::error::ExpansionError;
use posh_env::{Scope, ShellState};
use posh_fnmatch::{Config, Pattern, PatternChar};
use posh_syntax::Modifier;

/// What a parameter name refers to
pub enum ParamValue {
    /// An ordinary scalar, or `None` if unset
    Scalar(Option<String>),
    /// `$@` / `$*`: the positional parameters
    Positional(Vec<String>),
}

/// Looks up the value of a parameter name (without applying any modifier).
#[must_use]
pub fn lookup(name: &str, state: &ShellState) -> ParamValue {
    if name == "@" || name == "*" {
        return ParamValue::Positional(state.positional_params().to_vec());
    }
    if let Ok(index) = name.parse::<usize>() {
        if index == 0 {
            return ParamValue::Scalar(Some(state.shell_name.clone()));
        }
        return ParamValue::Scalar(state.positional_params().get(index - 1).cloned());
    }
    match name {
        "#" => ParamValue::Scalar(Some(state.positional_params().len().to_string())),
        "?" => ParamValue::Scalar(Some(state.last_exit_status.to_string())),
        "$" => ParamValue::Scalar(Some(std::process::id().to_string())),
        "!" => ParamValue::Scalar(None),
        "-" => ParamValue::Scalar(Some(posh_env::options::dash_flags(state.options))),
        _ => ParamValue::Scalar(cached_variable_value(name, state)),
    }
}

/// Looks up an ordinary (non-special) variable's value through the
/// generation-keyed cache on `state`, so repeated reads of the same name in
/// a tight loop skip the hash map lookup once nothing has been written.
fn cached_variable_value(name: &str, state: &ShellState) -> Option<String> {
    let generation = state.variables.generation();
    if let Some(cached) = state.cache.cached_variable(name, generation) {
        return cached;
    }
    let value = state.variable_value(name).map(str::to_string);
    state.cache.store_variable(name, generation, value.clone());
    value
}

/// The first character of `IFS`, for joining `"$*"`, absent if `IFS` is set
/// but empty, defaulting to a space if `IFS` is unset.
fn star_join_separator(state: &ShellState) -> Option<char> {
    match state.variables.get("IFS") {
        None => Some(' '),
        Some(v) => v.value.as_deref().and_then(|s| s.chars().next()),
    }
}

/// Joins `$*`'s positional parameters into the single field it expands to.
#[must_use]
pub fn join_star(values: &[String], state: &ShellState) -> String {
    match star_join_separator(state) {
        Some(sep) => values.join(&sep.to_string()),
        None => values.concat(),
    }
}

/// Expands a scalar parameter reference, applying `nounset` and returning
/// the raw (unquoted-provenance) characters. The caller attaches quoting.
pub fn expand_scalar(
    name: &str,
    state: &ShellState,
) -> Result<Option<String>, ExpansionError> {
    let value = match lookup(name, state) {
        ParamValue::Scalar(v) => v,
        ParamValue::Positional(values) => Some(join_star(&values, state)),
    };
    if value.is_none() && state.options.nounset() && !is_special(name) {
        return Err(ExpansionError::UnsetVariable {
            name: name.to_string(),
        });
    }
    Ok(value)
}

fn is_special(name: &str) -> bool {
    matches!(name, "?" | "$" | "!" | "-" | "#" | "@" | "*")
        || name.parse::<usize>().is_ok()
}

/// Applies a `${name<modifier>}` modifier, given the scalar value (or `None`
/// if unset) and whether it's empty.
///
/// `expand_operand` expands a modifier's own word operand (`w` in
/// `${name:-w}`) into a plain string; it is passed in rather than called
/// directly here so this module doesn't need to depend on the rest of the
/// expansion pipeline.
pub fn apply_modifier(
    name: &str,
    value: Option<&str>,
    modifier: &Modifier,
    state: &mut ShellState,
    mut expand_operand: impl FnMut(&posh_syntax::Word, &mut ShellState) -> Result<String, ExpansionError>,
) -> Result<Vec<AttrChar>, ExpansionError> {
    let is_unset_or_empty = value.map_or(true, str::is_empty);
    let mut out = Vec::new();
    match modifier {
        Modifier::None => push_str(&mut out, value.unwrap_or(""), false),
        Modifier::Length => push_str(&mut out, &value.unwrap_or("").chars().count().to_string(), false),
        Modifier::DefaultIfUnsetOrEmpty(w) => {
            if is_unset_or_empty {
                push_str(&mut out, &expand_operand(w, state)?, false);
            } else {
                push_str(&mut out, value.unwrap(), false);
            }
        }
        Modifier::AssignIfUnsetOrEmpty(w) => {
            if is_unset_or_empty {
                let assigned = expand_operand(w, state)?;
                if name.parse::<usize>().is_ok() || is_special(name) {
                    return Err(ExpansionError::CannotAssign {
                        name: name.to_string(),
                    });
                }
                state
                    .variables
                    .get_or_new(name, Scope::Local)
                    .assign(assigned.clone(), None)
                    .map_err(|_| ExpansionError::CannotAssign {
                        name: name.to_string(),
                    })?;
                push_str(&mut out, &assigned, false);
            } else {
                push_str(&mut out, value.unwrap(), false);
            }
        }
        Modifier::ErrorIfUnsetOrEmpty(w) => {
            if is_unset_or_empty {
                let message = expand_operand(w, state)?;
                let message = if message.is_empty() {
                    "parameter null or not set".to_string()
                } else {
                    message
                };
                return Err(ExpansionError::ErrorIfUnsetOrEmpty {
                    name: name.to_string(),
                    message,
                });
            }
            push_str(&mut out, value.unwrap(), false);
        }
        Modifier::AlternateIfNotEmpty(w) => {
            if !is_unset_or_empty {
                push_str(&mut out, &expand_operand(w, state)?, false);
            }
        }
        Modifier::RemoveSmallestPrefix(w) => {
            let pattern = expand_operand(w, state)?;
            out = strip(value.unwrap_or(""), &pattern, Strip::SmallestPrefix)?;
        }
        Modifier::RemoveLargestPrefix(w) => {
            let pattern = expand_operand(w, state)?;
            out = strip(value.unwrap_or(""), &pattern, Strip::LargestPrefix)?;
        }
        Modifier::RemoveSmallestSuffix(w) => {
            let pattern = expand_operand(w, state)?;
            out = strip(value.unwrap_or(""), &pattern, Strip::SmallestSuffix)?;
        }
        Modifier::RemoveLargestSuffix(w) => {
            let pattern = expand_operand(w, state)?;
            out = strip(value.unwrap_or(""), &pattern, Strip::LargestSuffix)?;
        }
        Modifier::ReplaceFirst(pat, repl) => {
            let pattern = expand_operand(pat, state)?;
            let replacement = expand_operand(repl, state)?;
            out = replace(value.unwrap_or(""), &pattern, &replacement, false)?;
        }
        Modifier::ReplaceAll(pat, repl) => {
            let pattern = expand_operand(pat, state)?;
            let replacement = expand_operand(repl, state)?;
            out = replace(value.unwrap_or(""), &pattern, &replacement, true)?;
        }
        Modifier::ReplacePrefix(pat, repl) => {
            let pattern = expand_operand(pat, state)?;
            let replacement = expand_operand(repl, state)?;
            out = strip_anchored(value.unwrap_or(""), &pattern, &replacement, true)?;
        }
        Modifier::ReplaceSuffix(pat, repl) => {
            let pattern = expand_operand(pat, state)?;
            let replacement = expand_operand(repl, state)?;
            out = strip_anchored(value.unwrap_or(""), &pattern, &replacement, false)?;
        }
        Modifier::UppercaseFirst => out = case_convert(value.unwrap_or(""), true, true),
        Modifier::UppercaseAll => out = case_convert(value.unwrap_or(""), true, false),
        Modifier::LowercaseFirst => out = case_convert(value.unwrap_or(""), false, true),
        Modifier::LowercaseAll => out = case_convert(value.unwrap_or(""), false, false),
    }
    Ok(out)
}

fn case_convert(value: &str, upper: bool, first_only: bool) -> Vec<AttrChar> {
    let mut out = Vec::new();
    for (i, c) in value.chars().enumerate() {
        let converted = if first_only && i > 0 {
            c
        } else if upper {
            c.to_ascii_uppercase()
        } else {
            c.to_ascii_lowercase()
        };
        out.push(AttrChar::unquoted(converted));
    }
    out
}

enum Strip {
    SmallestPrefix,
    LargestPrefix,
    SmallestSuffix,
    LargestSuffix,
}

fn pattern_chars(s: &str) -> impl Iterator<Item = PatternChar> + Clone + '_ {
    s.chars().map(PatternChar::Normal)
}

fn strip(value: &str, pattern: &str, kind: Strip) -> Result<Vec<AttrChar>, ExpansionError> {
    let anchor_begin = matches!(kind, Strip::SmallestPrefix | Strip::LargestPrefix);
    let config = Config {
        anchor_begin,
        anchor_end: !anchor_begin,
    };
    let compiled = Pattern::with_config(pattern_chars(pattern), config)
        .map_err(|e| ExpansionError::Pattern { message: e.to_string() })?;
    let matched_range = match kind {
        Strip::SmallestPrefix => compiled
            .as_regex()
            .find_iter(value)
            .filter(|m| m.start() == 0)
            .min_by_key(|m| m.end()),
        Strip::LargestPrefix => compiled
            .as_regex()
            .find_iter(value)
            .filter(|m| m.start() == 0)
            .max_by_key(|m| m.end()),
        Strip::SmallestSuffix => compiled
            .as_regex()
            .find_iter(value)
            .filter(|m| m.end() == value.len())
            .max_by_key(|m| m.start()),
        Strip::LargestSuffix => compiled
            .as_regex()
            .find_iter(value)
            .filter(|m| m.end() == value.len())
            .min_by_key(|m| m.start()),
    };
    let remaining = match matched_range {
        Some(m) => match kind {
            Strip::SmallestPrefix | Strip::LargestPrefix => &value[m.end()..],
            Strip::SmallestSuffix | Strip::LargestSuffix => &value[..m.start()],
        },
        None => value,
    };
    let mut out = Vec::new();
    push_str(&mut out, remaining, false);
    Ok(out)
}

fn replace(
    value: &str,
    pattern: &str,
    replacement: &str,
    all: bool,
) -> Result<Vec<AttrChar>, ExpansionError> {
    let compiled = Pattern::with_config(pattern_chars(pattern), Config::default())
        .map_err(|e| ExpansionError::Pattern { message: e.to_string() })?;
    let mut out = String::new();
    let mut offset = 0;
    while offset <= value.len() {
        match compiled.as_regex().find(&value[offset..]) {
            Some(m) => {
                let abs_start = offset + m.start();
                let abs_end = offset + m.end();
                out.push_str(&value[offset..abs_start]);
                out.push_str(replacement);
                offset = if abs_end > abs_start { abs_end } else { abs_end + 1 };
                if abs_end == abs_start && abs_start < value.len() {
                    out.push_str(&value[abs_start..abs_start + 1]);
                }
                if !all {
                    out.push_str(&value[offset.min(value.len())..]);
                    break;
                }
            }
            None => {
                out.push_str(&value[offset..]);
                break;
            }
        }
    }
    let mut result = Vec::new();
    push_str(&mut result, &out, false);
    Ok(result)
}

fn strip_anchored(
    value: &str,
    pattern: &str,
    replacement: &str,
    prefix: bool,
) -> Result<Vec<AttrChar>, ExpansionError> {
    let config = Config {
        anchor_begin: prefix,
        anchor_end: !prefix,
    };
    let compiled = Pattern::with_config(pattern_chars(pattern), config)
        .map_err(|e| ExpansionError::Pattern { message: e.to_string() })?;
    let out = if prefix {
        match compiled.find(value).filter(|m| m.start() == 0) {
            Some(m) => format!("{replacement}{}", &value[m.end()..]),
            None => value.to_string(),
        }
    } else {
        match compiled.find(value).filter(|m| m.end() == value.len()) {
            Some(m) => format!("{}{replacement}", &value[..m.start()]),
            None => value.to_string(),
        }
    };
    let mut result = Vec::new();
    push_str(&mut result, &out, false);
    Ok(result)
}

#[must_use]
pub fn to_string(chars: &[AttrChar]) -> String {
    to_plain_string(chars)
}
