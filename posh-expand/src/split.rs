// This file is part of posh, a POSIX-style shell.

//! Word splitting on `$IFS`
//!
//! Only characters that came from unquoted source text are eligible
//! separators; a quoted field separator character is just a character.

use crate::attr::AttrChar;
use posh_env::ShellState;

/// The default `IFS`: space, tab, newline.
pub const DEFAULT_IFS: &str = " \t\n";

fn ifs(state: &ShellState) -> String {
    match state.variables.get("IFS") {
        None => DEFAULT_IFS.to_string(),
        Some(v) => v.value.clone().unwrap_or_default(),
    }
}

/// Splits one field's characters on `IFS`, dropping empty fields produced by
/// runs of whitespace-class separators the way POSIX field splitting does,
/// but keeping empty fields that a non-whitespace separator delimits.
#[must_use]
pub fn split(field: &[AttrChar], state: &ShellState) -> Vec<Vec<AttrChar>> {
    let ifs = ifs(state);
    if ifs.is_empty() {
        return vec![field.to_vec()];
    }
    let whitespace: Vec<char> = ifs.chars().filter(|c| c.is_whitespace()).collect();
    let mut fields = Vec::new();
    let mut current = Vec::new();
    let mut chars = field.iter().peekable();
    let mut started = false;
    while let Some(&c) = chars.peek() {
        if !c.quoted && ifs.contains(c.value) {
            if whitespace.contains(&c.value) {
                chars.next();
                while let Some(&next) = chars.peek() {
                    if !next.quoted && whitespace.contains(&next.value) {
                        chars.next();
                    } else {
                        break;
                    }
                }
                if started {
                    fields.push(std::mem::take(&mut current));
                }
                started = false;
                continue;
            }
            chars.next();
            fields.push(std::mem::take(&mut current));
            started = true;
            continue;
        }
        current.push(c);
        started = true;
        chars.next();
    }
    if started || !current.is_empty() {
        fields.push(current);
    }
    if fields.is_empty() {
        fields.push(Vec::new());
    }
    fields
}
