// This file is part of posh, a POSIX-style shell.

//! Command line argument parser for the shell
//!
//! Trimmed to the surface this shell actually exposes: a leading run of
//! `-`/`+` option letters, `--` to end option parsing, then either a `-c`
//! command string or a script path, with everything after becoming the
//! positional parameters. No `--long-option` forms, no `-o name`, no
//! `--profile`/`--rcfile`: those belong to a full login-shell startup
//! sequence this shell doesn't implement.

use posh_env::options::{self, State};
use std::iter::Peekable;
use thiserror::Error;

/// Where the program text to run comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Interactive REPL on standard input (no operand, no `-c`).
    Stdin,
    /// A script file given as an operand.
    File { path: String },
    /// The `-c` operand.
    String(String),
}

/// Parsed invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Invocation {
    pub source: Option<Source>,
    pub options: Vec<(options::Options, State)>,
    /// `$0`
    pub arg0: String,
    pub positional_params: Vec<String>,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("unknown option `-{0}`")]
    UnknownOption(char),
    #[error("missing command string for `-c`")]
    MissingCommandString,
}

/// Parses `argv[1..]` (the caller strips `argv[0]` itself into `arg0`).
pub fn parse<I, S>(arg0: String, args: I) -> Result<Invocation, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into).peekable();
    let mut invocation = Invocation {
        arg0,
        ..Invocation::default()
    };
    let mut command_string = false;

    while let Some(arg) = args.next_if(is_option) {
        let negate = arg.starts_with('+');
        for c in arg[1..].chars() {
            if c == 'c' {
                command_string = true;
                continue;
            }
            if c == 's' {
                invocation.source = Some(Source::Stdin);
                continue;
            }
            let Some((flag, state)) = options::parse_short(c) else {
                return Err(Error::UnknownOption(c));
            };
            let state = if negate { negate_state(state) } else { state };
            invocation.options.push((flag, state));
        }
    }

    args.next_if(|a| a == "--");

    if command_string {
        let command = args.next_if(|_| true).ok_or(Error::MissingCommandString)?;
        invocation.source = Some(Source::String(command));
        if let Some(name) = args.next_if(|_| true) {
            invocation.arg0 = name;
        }
    } else if invocation.source.is_none() {
        if let Some(path) = args.next_if(|_| true) {
            invocation.arg0 = path.clone();
            invocation.source = Some(Source::File { path });
        }
    }

    invocation.positional_params = args.collect();
    Ok(invocation)
}

fn is_option(arg: &String) -> bool {
    if arg == "--" {
        return false;
    }
    let mut chars = arg.chars();
    match chars.next() {
        Some('-') | Some('+') => chars.next().is_some(),
        _ => false,
    }
}

fn negate_state(state: State) -> State {
    match state {
        State::On => State::Off,
        State::Off => State::On,
    }
}
