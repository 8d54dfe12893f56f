// This file is part of posh, a POSIX-style shell.

//! The seam between expansion and execution
//!
//! `$(...)` and `` `...` `` both need to run a shell program and capture its
//! output, which is the executor's job, not this crate's. `posh-expand`
//! cannot depend on `posh-exec` (the dependency runs the other way: the
//! executor calls into the expander to materialize words), so this trait is
//! the inversion point, mirroring how `ExecutorHost` lets the core stay
//! decoupled from the real OS.

/// Runs a shell program and captures its standard output, for command
/// substitution.
pub trait CommandSubstExecutor {
    type Error: std::fmt::Display;

    /// Parses and runs `source` as a shell program, returning everything it
    /// wrote to standard output with trailing newlines stripped (the
    /// stripping itself is done by the caller, not the implementation).
    fn run_capturing_stdout(&mut self, source: &str) -> Result<String, Self::Error>;
}

/// Strips every trailing newline, per the command substitution rule.
#[must_use]
pub fn strip_trailing_newlines(mut s: String) -> String {
    while s.ends_with('\n') {
        s.pop();
    }
    s
}
