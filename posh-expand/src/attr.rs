// This file is part of posh, a POSIX-style shell.

//! Per-character provenance carried through expansion
//!
//! Each character produced by expanding a word remembers whether it came
//! from quoted source text. Quoted characters are immune to word splitting
//! and are matched literally (not as glob metacharacters) during pathname
//! expansion; unquoted characters are fair game for both.

/// One character of an expansion result, plus whether it is quoted
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttrChar {
    pub value: char,
    pub quoted: bool,
}

impl AttrChar {
    #[must_use]
    pub fn quoted(value: char) -> Self {
        AttrChar { value, quoted: true }
    }

    #[must_use]
    pub fn unquoted(value: char) -> Self {
        AttrChar {
            value,
            quoted: false,
        }
    }
}

/// Appends every character of `s` to `out`, all sharing `quoted`.
pub fn push_str(out: &mut Vec<AttrChar>, s: &str, quoted: bool) {
    out.extend(s.chars().map(|c| AttrChar { value: c, quoted }));
}

/// Strips the quoting mark, yielding the plain string a field prints as.
#[must_use]
pub fn to_plain_string(chars: &[AttrChar]) -> String {
    chars.iter().map(|c| c.value).collect()
}
