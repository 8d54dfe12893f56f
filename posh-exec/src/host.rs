// This file is part of posh, a POSIX-style shell.

//! The boundary between the executor and the operating system
//!
//! The executor never opens files, forks, `dup2`s, or waits on its own: it
//! resolves argv, assignments and redirection targets (running the
//! expander) and hands them to an [`ExecutorHost`], mirroring the split
//! between a `System` trait and its real/fake implementations. A binary
//! crate implements this against `std::process::Command`; tests implement
//! it against an in-memory fake.

use posh_syntax::RedirOp;

/// One redirection with its target already expanded to a plain string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedRedirection {
    pub fd: u32,
    pub op: RedirOp,
    pub target: String,
}

/// One pipeline stage, fully resolved and ready to run.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct ResolvedCommand {
    pub argv: Vec<String>,
    pub env_overrides: Vec<(String, String)>,
    pub redirections: Vec<ResolvedRedirection>,
}

/// A built-in command body, looked up by name.
///
/// No built-in bodies ship with this crate (they are a separate
/// collaborator); this type exists so a host can register its own without
/// the executor needing an open-ended registry of its own.
pub type Builtin<H> = fn(&mut crate::executor::Executor<'_, H>, &[String]) -> i32;

pub trait ExecutorHost {
    type Error: std::fmt::Display;

    /// Runs one or more pipeline stages connected by pipes, blocking until
    /// the last stage exits, and returns its status. A single-element slice
    /// is an ordinary (non-piped) command.
    fn run_pipeline(&mut self, stages: &[ResolvedCommand]) -> Result<i32, Self::Error>;

    /// Starts a pipeline in the background (`&`) without waiting for it;
    /// the executor's own status after this call is always `0`.
    fn run_background(&mut self, stages: &[ResolvedCommand]) -> Result<(), Self::Error>;

    /// Redirects standard output to an in-memory sink for the duration of a
    /// command substitution, pushing a new capture frame.
    fn push_stdout_capture(&mut self);

    /// Pops the innermost capture frame, returning everything written to it.
    fn pop_stdout_capture(&mut self) -> Vec<u8>;

    /// Looks up a built-in by name; `None` means "no built-in with this
    /// name", not "error".
    fn lookup_builtin(&self, _name: &str) -> Option<Builtin<Self>>
    where
        Self: Sized,
    {
        None
    }
}
