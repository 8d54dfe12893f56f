// This file is part of posh, a POSIX-style shell.

//! The AST executor
//!
//! [`Executor`] walks a parsed [`posh_syntax::List`] and carries out its
//! effects against a [`posh_env::ShellState`], delegating every OS-facing
//! effect (running a process, piping, capturing output) to a caller-supplied
//! [`ExecutorHost`]. Word materialization and all the quoting/splitting
//! rules around it are `posh-expand`'s job; this crate only decides *when*
//! to expand a word and what to do with the result.

pub mod command_subst;
pub mod divert;
pub mod error;
pub mod executor;
pub mod host;

pub use divert::{Divert, ExecResult};
pub use error::ExecError;
pub use executor::Executor;
pub use host::{Builtin, ExecutorHost, ResolvedCommand, ResolvedRedirection};

use posh_env::ShellState;
use posh_syntax::List;

/// Runs a whole program to completion and returns the exit status a shell
/// invoked on this list would report, collapsing any unhandled `Divert`
/// (`exit` falls through to here at the top level; a stray `return`/`break`/
/// `continue` outside any function or loop is a no-op past its own status,
/// mirroring how real shells warn but don't crash on it).
pub fn execute_program<H: ExecutorHost>(list: &List, state: &mut ShellState, host: &mut H) -> i32 {
    let mut executor = Executor::new(state, host);
    match executor.exec_list(list) {
        std::ops::ControlFlow::Continue(status) => status,
        std::ops::ControlFlow::Break(Divert::Exit(status) | Divert::Return(status)) => status,
        std::ops::ControlFlow::Break(Divert::Break { .. } | Divert::Continue { .. }) => {
            log::warn!("`break`/`continue` used outside a loop");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::{Parser, Source};
    use std::cell::RefCell;

    /// An in-memory host: external commands are canned responses keyed by
    /// argv[0], there is no real process table, and standard output capture
    /// is a stack of byte buffers.
    #[derive(Default)]
    struct FakeHost {
        responses: std::collections::HashMap<String, i32>,
        capture_stack: Vec<Vec<u8>>,
        written: RefCell<Vec<String>>,
    }

    impl FakeHost {
        fn with_status(name: &str, status: i32) -> Self {
            let mut host = FakeHost::default();
            host.responses.insert(name.to_string(), status);
            host
        }
    }

    impl ExecutorHost for FakeHost {
        type Error = std::convert::Infallible;

        fn run_pipeline(&mut self, stages: &[ResolvedCommand]) -> Result<i32, Self::Error> {
            let mut status = 0;
            for stage in stages {
                status = *self.responses.get(&stage.argv[0]).unwrap_or(&0);
                // Only `echo` produces output in this fake; `true`/`false`
                // and anything else are status-only, like the real thing.
                if stage.argv[0] == "echo" {
                    let line = stage.argv.join(" ");
                    if let Some(buf) = self.capture_stack.last_mut() {
                        buf.extend_from_slice(line.as_bytes());
                        buf.push(b'\n');
                    } else {
                        self.written.borrow_mut().push(line);
                    }
                }
            }
            Ok(status)
        }

        fn run_background(&mut self, _stages: &[ResolvedCommand]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn push_stdout_capture(&mut self) {
            self.capture_stack.push(Vec::new());
        }

        fn pop_stdout_capture(&mut self) -> Vec<u8> {
            self.capture_stack.pop().unwrap_or_default()
        }
    }

    fn parse(source: &str) -> List {
        Parser::parse_complete(source, Source::Unknown).unwrap()
    }

    fn run(source: &str, host: &mut FakeHost) -> i32 {
        let mut state = ShellState::new("posh");
        execute_program(&parse(source), &mut state, host)
    }

    #[test]
    fn simple_command_runs_through_the_host() {
        let mut host = FakeHost::default();
        let status = run("echo hi", &mut host);
        assert_eq!(status, 0);
        assert_eq!(host.written.borrow().as_slice(), ["echo hi".to_string()]);
    }

    #[test]
    fn and_or_short_circuits() {
        let mut host = FakeHost::with_status("false", 1);
        assert_eq!(run("false && echo unreached", &mut host), 1);
        assert!(host.written.borrow().is_empty());
        assert_eq!(run("false || echo reached", &mut host), 0);
        assert_eq!(host.written.borrow().as_slice(), ["echo reached".to_string()]);
    }

    #[test]
    fn errexit_aborts_the_rest_of_the_list() {
        let mut host = FakeHost::with_status("false", 1);
        let mut state = ShellState::new("posh");
        posh_env::options::apply_short(&mut state.options, 'e');
        let status = execute_program(&parse("false; echo unreached"), &mut state, &mut host);
        assert_eq!(status, 1);
        assert!(host.written.borrow().is_empty());
    }

    #[test]
    fn if_chooses_the_matching_branch() {
        let mut host = FakeHost::with_status("false", 1);
        let status = run("if false; then echo a; else echo b; fi", &mut host);
        assert_eq!(status, 0);
        assert_eq!(host.written.borrow().as_slice(), ["echo b".to_string()]);
    }

    #[test]
    fn for_loop_iterates_given_words() {
        let mut host = FakeHost::default();
        run("for x in a b c; do echo $x; done", &mut host);
        assert_eq!(
            host.written.borrow().as_slice(),
            ["echo a".to_string(), "echo b".to_string(), "echo c".to_string()]
        );
    }

    #[test]
    fn break_stops_a_while_loop() {
        let mut host = FakeHost::with_status("true", 0);
        let status = run("while true; do echo once; break; done", &mut host);
        assert_eq!(status, 0);
        assert_eq!(host.written.borrow().as_slice(), ["echo once".to_string()]);
    }

    #[test]
    fn case_matches_the_first_pattern_that_fits() {
        let mut host = FakeHost::default();
        run("case hello in h*) echo matched ;; *) echo fallback ;; esac", &mut host);
        assert_eq!(host.written.borrow().as_slice(), ["echo matched".to_string()]);
    }

    #[test]
    fn quoted_glob_metacharacter_in_a_case_pattern_does_not_act_as_a_wildcard() {
        let mut host = FakeHost::default();
        // If the quotes around the first pattern were ignored, `a*b` would
        // match `axb` via the wildcard and print "literal" instead.
        run("case axb in 'a*b') echo literal ;; a*b) echo glob ;; esac", &mut host);
        assert_eq!(host.written.borrow().as_slice(), ["echo glob".to_string()]);
    }

    #[test]
    fn function_call_sees_its_own_positional_parameters() {
        let mut host = FakeHost::default();
        run("greet() { echo $1; }; greet world", &mut host);
        assert_eq!(host.written.borrow().as_slice(), ["echo world".to_string()]);
    }

    #[test]
    fn return_from_a_function_does_not_exit_the_script() {
        let mut host = FakeHost::default();
        let status = run("f() { return 3; echo unreached; }; f; echo after", &mut host);
        assert_eq!(status, 0);
        assert_eq!(host.written.borrow().as_slice(), ["echo after".to_string()]);
    }

    #[test]
    fn prefix_assignment_is_not_visible_after_the_command() {
        let mut host = FakeHost::default();
        let mut state = ShellState::new("posh");
        execute_program(&parse("X=1 echo $X"), &mut state, &mut host);
        assert_eq!(state.variable_value("X"), None);
    }

    #[test]
    fn bare_assignment_persists_in_the_current_scope() {
        let mut host = FakeHost::default();
        let mut state = ShellState::new("posh");
        execute_program(&parse("X=1"), &mut state, &mut host);
        assert_eq!(state.variable_value("X"), Some("1"));
    }
}
