// This file is part of posh, a POSIX-style shell.

//! Pathname (glob) expansion
//!
//! Grounded on `posh-fnmatch::Pattern`, which already compiles a shell glob
//! to an anchored regular expression; this module only has to walk the
//! filesystem and apply the hidden-file rule.

use crate::attr::AttrChar;
use posh_fnmatch::ast::Atom;
use posh_fnmatch::{Config, Pattern, PatternChar};
use std::path::{Path, PathBuf};

/// Expands one field's worth of characters as a pathname pattern.
///
/// Quoted characters match themselves literally; unquoted characters keep
/// their glob meaning. Returns `None` if the field contains no unquoted
/// glob metacharacter at all (the common case, so callers can skip the
/// filesystem walk), or `Some(matches)` (empty if the pattern is well-formed
/// but nothing on disk matches; the field should then expand to itself
/// unchanged, handled by the caller).
#[must_use]
pub fn expand(field: &[AttrChar]) -> Option<Vec<String>> {
    if !has_glob_metachar(field) {
        return None;
    }
    let pattern_source: Vec<PatternChar> = field
        .iter()
        .map(|c| {
            if c.quoted {
                PatternChar::Literal(c.value)
            } else {
                PatternChar::Normal(c.value)
            }
        })
        .collect();
    let pattern = Pattern::with_config(pattern_source, Config::full_match()).ok()?;
    let mut matches = matching_paths(&pattern);
    matches.sort();
    Some(matches)
}

fn has_glob_metachar(field: &[AttrChar]) -> bool {
    field
        .iter()
        .any(|c| !c.quoted && matches!(c.value, '*' | '?' | '['))
}

fn matching_paths(pattern: &Pattern) -> Vec<String> {
    let mut results = Vec::new();
    let has_explicit_leading_dot = matches!(pattern.ast().atoms.first(), Some(Atom::Char('.')));
    let dir = Path::new(".");
    let Ok(entries) = std::fs::read_dir(dir) else {
        return results;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') && !has_explicit_leading_dot {
            continue;
        }
        if pattern.is_match(&name) {
            results.push(name.into_owned());
        }
    }
    results
}

/// Resolves `~` or `~name` to a home directory, returning the original
/// text unchanged if no match is found.
#[must_use]
pub fn expand_tilde(prefix: &str) -> String {
    if prefix.is_empty() {
        return std::env::var("HOME").unwrap_or_else(|_| format!("~{prefix}"));
    }
    home_of_user(prefix).unwrap_or_else(|| format!("~{prefix}"))
}

fn home_of_user(_name: &str) -> Option<PathBuf> {
    None
}
