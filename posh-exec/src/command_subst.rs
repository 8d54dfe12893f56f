// This file is part of posh, a POSIX-style shell.

//! Closes the expansion/execution seam: running `$(...)` means parsing and
//! executing a nested program, which only this crate knows how to do.

use crate::divert::Divert;
use crate::error::ExecError;
use crate::executor::Executor;
use crate::host::ExecutorHost;
use posh_env::ShellState;
use posh_expand::command_subst::CommandSubstExecutor;
use posh_syntax::{Parser, Source};

/// Implements [`CommandSubstExecutor`] without holding a live borrow of the
/// enclosing [`Executor`]'s `ShellState`.
///
/// An `Executor` can't implement the trait on itself: expanding a word calls
/// `expand_word(word, &mut state, &mut host)` with two independent `&mut`
/// borrows, and if `host` were the `Executor` itself, `host` would alias
/// `state` (both reach the same `ShellState` through `self`). So the seam is
/// a separate value holding only the OS-facing host plus a snapshot of the
/// state to run the substitution against, which also happens to be exactly
/// right semantically, since `$(...)` runs in a subshell environment: it
/// cannot be observed to mutate the parent's variables.
pub struct Subst<'a, H: ExecutorHost> {
    pub host: &'a mut H,
    pub base_state: ShellState,
}

impl<H: ExecutorHost> CommandSubstExecutor for Subst<'_, H> {
    type Error = ExecError;

    fn run_capturing_stdout(&mut self, source: &str) -> Result<String, ExecError> {
        let list = Parser::parse_complete(source, Source::Unknown)
            .map_err(|e| ExecError::Host(e.to_string()))?;

        let mut sub_state = self.base_state.clone();
        self.host.push_stdout_capture();
        let mut sub = Executor::new(&mut sub_state, &mut *self.host);
        let outcome = sub.exec_list(&list);
        let captured = self.host.pop_stdout_capture();

        // The substitution runs in its own subshell snapshot, so its exit
        // status doesn't reach the parent's `$?` here; callers that care
        // (e.g. a bare `$(cmd)` used as a whole command) read it some other
        // way. Only the captured bytes escape.
        let _status = match outcome {
            std::ops::ControlFlow::Continue(status) => status,
            std::ops::ControlFlow::Break(Divert::Exit(status) | Divert::Return(status)) => status,
            // `break`/`continue` escaping a `$(...)` with no enclosing loop
            // of its own has nothing to unwind to; treat it as success.
            std::ops::ControlFlow::Break(Divert::Break { .. } | Divert::Continue { .. }) => 0,
        };

        Ok(String::from_utf8_lossy(&captured).into_owned())
    }
}
