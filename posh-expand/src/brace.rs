// This file is part of posh, a POSIX-style shell.

//! Brace expansion (`{a,b,c}`, `{1..5}`, `{01..10..2}`)
//!
//! A non-POSIX extension with no direct precedent elsewhere in this
//! workspace; built here from scratch, grounded on the general shape of shell
//! brace expansion and reusing this crate's own `Word`/`WordUnit` splicing
//! idiom for the rest of the pipeline. Runs before any other expansion, on
//! literal unquoted text only: a brace group that straddles a quote or a
//! parameter expansion is left alone, matching the common shell behavior
//! that brace expansion operates on raw source text.

use posh_syntax::{TextUnit, Word, WordUnit};

/// Expands every top-level brace group in `word`, returning the resulting
/// words in order. If `word` contains no recognizable brace group, returns
/// `vec![word.clone()]`.
#[must_use]
pub fn brace_expand(word: &Word) -> Vec<Word> {
    for (unit_index, unit) in word.units.iter().enumerate() {
        let WordUnit::Unquoted(TextUnit::Literal(text)) = unit else {
            continue;
        };
        if let Some((start, end, alternatives)) = find_and_expand(text) {
            let mut results = Vec::with_capacity(alternatives.len());
            for alt in alternatives {
                let mut units = word.units[..unit_index].to_vec();
                push_literal(&mut units, &text[..start]);
                push_literal(&mut units, &alt);
                push_literal(&mut units, &text[end..]);
                units.extend(word.units[unit_index + 1..].iter().cloned());
                let spliced = Word {
                    units,
                    location: word.location.clone(),
                };
                results.extend(brace_expand(&spliced));
            }
            return results;
        }
    }
    vec![word.clone()]
}

fn push_literal(units: &mut Vec<WordUnit>, s: &str) {
    if !s.is_empty() {
        units.push(WordUnit::Unquoted(TextUnit::Literal(s.to_string())));
    }
}

/// Finds the first expandable `{...}` group in `text` and returns its byte
/// range together with its expansions.
fn find_and_expand(text: &str) -> Option<(usize, usize, Vec<String>)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = matching_brace(text, i) {
                let body = &text[i + 1..end];
                if let Some(alts) = expand_body(body) {
                    return Some((i, end + 1, alts));
                }
            }
        }
        i += 1;
    }
    None
}

/// Finds the index of the `}` matching the `{` at `open`, if braces balance.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices().skip_while(|&(i, _)| i < open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Expands a brace group's interior (without the surrounding braces) into
/// its alternatives, or `None` if it isn't a comma list or a range (in which
/// case the group passes through literally, per POSIX shell convention for
/// malformed brace expressions).
fn expand_body(body: &str) -> Option<Vec<String>> {
    if let Some(range) = expand_range(body) {
        return Some(range);
    }
    let items = split_top_level_commas(body);
    if items.len() < 2 {
        return None;
    }
    Some(items)
}

/// Splits on commas at brace-nesting depth 0.
fn split_top_level_commas(body: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                items.push(body[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(body[start..].to_string());
    items
}

/// Recognizes `m..n` or `m..n..step`, numeric (with optional zero padding
/// preserved) or single-character.
fn expand_range(body: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = body.split("..").collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    if let (Ok(start), Ok(end)) = (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
        let step = match parts.get(2) {
            Some(s) => s.parse::<i64>().ok()?.unsigned_abs() as i64,
            None => 1,
        };
        let step = step.max(1);
        let width = if (parts[0].starts_with('0') || parts[0].starts_with("-0"))
            && parts[0].trim_start_matches('-').len() > 1
        {
            parts[0].trim_start_matches('-').len()
        } else {
            0
        };
        let mut values = Vec::new();
        if start <= end {
            let mut v = start;
            while v <= end {
                values.push(format_padded(v, width));
                v += step;
            }
        } else {
            let mut v = start;
            while v >= end {
                values.push(format_padded(v, width));
                v -= step;
            }
        }
        return Some(values);
    }
    if parts.len() == 2 {
        let mut start_chars = parts[0].chars();
        let mut end_chars = parts[1].chars();
        if let (Some(start), None, Some(end), None) = (
            start_chars.next(),
            start_chars.next(),
            end_chars.next(),
            end_chars.next(),
        ) {
            let (start, end) = (start as u32, end as u32);
            let mut values = Vec::new();
            if start <= end {
                for v in start..=end {
                    values.push(char::from_u32(v)?.to_string());
                }
            } else {
                let mut v = start;
                loop {
                    values.push(char::from_u32(v)?.to_string());
                    if v == end {
                        break;
                    }
                    v -= 1;
                }
            }
            return Some(values);
        }
    }
    None
}

fn format_padded(v: i64, width: usize) -> String {
    if width == 0 {
        return v.to_string();
    }
    let negative = v < 0;
    let digits = v.unsigned_abs().to_string();
    let padded = if digits.len() < width {
        format!("{}{digits}", "0".repeat(width - digits.len()))
    } else {
        digits
    };
    if negative {
        format!("-{padded}")
    } else {
        padded
    }
}
