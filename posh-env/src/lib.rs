// This file is part of posh, a POSIX-style shell.

//! Shell execution state
//!
//! [`ShellState`](state::ShellState) bundles everything an executing tree can
//! see or mutate: a scoped [`VariableSet`](variable::VariableSet), a
//! [`FunctionSet`](function::FunctionSet), [`Options`](options::Options), and
//! the last exit status, plus a [`Cache`](cache::Cache) memoizing variable
//! reads and arithmetic evaluations against the variable set's generation
//! counter. There is no global state elsewhere in the workspace; every
//! crate that needs to read or change shell state takes a `&mut ShellState`.

pub mod cache;
pub mod function;
pub mod options;
pub mod state;
pub mod variable;

pub use cache::Cache;
pub use function::{DefineError, Function, FunctionSet};
pub use options::Options;
pub use state::ShellState;
pub use variable::{AssignError, Context, PositionalParams, Scope, UnsetError, Variable, VariableSet};
