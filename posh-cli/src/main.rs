// This file is part of posh, a POSIX-style shell.

//! Entry point: wires the hand-rolled argument parser, a [`ShellState`]
//! seeded from the process environment, and the real OS-backed
//! [`host::RealHost`] together, then either runs one parsed program (`-c`,
//! a script file) or drives the interactive REPL.

mod args;
mod host;
mod repl;

use args::Source;
use host::RealHost;
use posh_env::{options, ShellState};
use posh_syntax::{Parser, Source as SyntaxSource};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let mut argv = std::env::args();
    let arg0 = argv.next().unwrap_or_else(|| "posh".to_string());
    let invocation = match args::parse(arg0, argv) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("posh: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut state = ShellState::new(invocation.arg0);
    seed_environment(&mut state);
    for (flag, flag_state) in &invocation.options {
        match flag_state {
            options::State::On => state.options.insert(*flag),
            options::State::Off => state.options.remove(*flag),
        }
    }
    state.variables.positional_params_mut(posh_env::Scope::Global).values =
        invocation.positional_params;

    let mut host = RealHost::new();
    let status = match invocation.source {
        Some(Source::String(command)) => run_text(&command, SyntaxSource::CommandString, &mut state, &mut host),
        Some(Source::File { path }) => match std::fs::read_to_string(&path) {
            Ok(text) => run_text(&text, SyntaxSource::ScriptFile { path }, &mut state, &mut host),
            Err(e) => {
                eprintln!("posh: cannot read '{path}': {e}");
                127
            }
        },
        Some(Source::Stdin) | None => repl::run(&mut state, &mut host),
    };

    ExitCode::from((status & 0xff) as u8)
}

fn run_text<H: posh_exec::ExecutorHost>(
    text: &str,
    source: SyntaxSource,
    state: &mut ShellState,
    host: &mut H,
) -> i32 {
    match Parser::parse_complete(text, source) {
        Ok(list) => posh_exec::execute_program(&list, state, host),
        Err(e) => {
            eprintln!("posh: {e}");
            2
        }
    }
}

/// Inherits every variable from the parent process as an exported variable,
/// the same starting point a freshly execed shell gets from the kernel.
fn seed_environment(state: &mut ShellState) {
    for (name, value) in std::env::vars() {
        state
            .variables
            .get_or_new(name, posh_env::Scope::Global)
            .assign(value, None)
            .expect("a freshly created variable is never read-only")
            .export(true);
    }
}
