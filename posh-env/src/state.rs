// This file is part of posh, a POSIX-style shell.

//! The shell's mutable state, passed by reference to the executor
//!
//! There is no process-wide global: every piece of state an executing tree
//! can observe or mutate (variables, functions, the last exit status, option
//! flags) lives on one `ShellState` value that the caller owns and threads
//! through.

use crate::cache::Cache;
use crate::function::FunctionSet;
use crate::options::Options;
use crate::variable::{Scope, VariableSet};

/// The shell's state: variables, functions, the last exit status, and
/// option flags
#[derive(Clone, Debug, Default)]
pub struct ShellState {
    pub variables: VariableSet,
    pub functions: FunctionSet,
    pub options: Options,
    /// `$?`, the exit status of the most recently executed command
    pub last_exit_status: i32,
    /// `$0`: the shell or script name, not a positional parameter proper
    pub shell_name: String,
    /// Memoizes variable reads and arithmetic evaluations; see
    /// [`Cache`]. Interior-mutable so read-only lookup paths can use it.
    pub cache: Cache,
}

impl ShellState {
    #[must_use]
    pub fn new(shell_name: impl Into<String>) -> Self {
        ShellState {
            shell_name: shell_name.into(),
            ..Default::default()
        }
    }

    /// Looks up a variable's current scalar value, for expansion.
    #[must_use]
    pub fn variable_value(&self, name: &str) -> Option<&str> {
        self.variables.get(name)?.value.as_deref()
    }

    /// Returns the positional parameters visible to the innermost scope
    /// (a function's arguments if one is active, else the script's).
    #[must_use]
    pub fn positional_params(&self) -> &[String] {
        &self.variables.positional_params(Scope::Local).values
    }
}
