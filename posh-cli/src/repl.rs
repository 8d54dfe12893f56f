// This file is part of posh, a POSIX-style shell.

//! The interactive read-eval-print loop
//!
//! Reads one line at a time from standard input and feeds it to a single
//! resumable [`Parser`], so a construct that spans several lines (`if ...`
//! with no `then` yet) is recognized as incomplete and prompted for with
//! `$PS2` instead of erroring on the first line alone.

use posh_env::ShellState;
use posh_exec::ExecutorHost;
use posh_syntax::lexer::Lexer;
use posh_syntax::{ParseOutcome, Parser, Source};
use std::io::{self, Write};

const DEFAULT_PS1: &str = "$ ";
const DEFAULT_PS2: &str = "> ";

/// Runs the REPL to completion (standard input exhausted) and returns the
/// exit status of the last command run, or `0` if none ever ran.
pub fn run<H: ExecutorHost>(state: &mut ShellState, host: &mut H) -> i32 {
    let mut parser = Parser::new(Lexer::new("", Source::Interactive));
    let mut status = 0;
    let mut continuing = false;

    loop {
        print_prompt(state, continuing);
        let mut line = String::new();
        let n = io::stdin().read_line(&mut line).unwrap_or(0);
        if n == 0 {
            break;
        }

        match parser.feed_chunk(&line) {
            Ok(ParseOutcome::NeedsMore) => {
                continuing = true;
            }
            Ok(ParseOutcome::Complete(list)) => {
                continuing = false;
                status = posh_exec::execute_program(&list, state, host);
            }
            Err(e) => {
                eprintln!("posh: {e}");
                continuing = false;
                parser = Parser::new(Lexer::new("", Source::Interactive));
            }
        }
    }

    status
}

fn print_prompt(state: &ShellState, continuing: bool) {
    let prompt = if continuing {
        state.variable_value("PS2").unwrap_or(DEFAULT_PS2)
    } else {
        state.variable_value("PS1").unwrap_or(DEFAULT_PS1)
    };
    eprint!("{prompt}");
    let _ = io::stderr().flush();
}
