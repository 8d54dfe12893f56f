// This file is part of posh, a POSIX-style shell.

//! Control-flow signals that unwind through the executor without being
//! reported as errors: `break`, `continue`, `return`, `exit`.

/// What the executor should do instead of continuing straight-line
/// execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Divert {
    /// `continue [n]`: resume the loop `count` levels out (`0` = innermost).
    Continue { count: u32 },
    /// `break [n]`: exit the loop `count` levels out (`0` = innermost).
    Break { count: u32 },
    /// `return [n]`: return from the current function or, at the top
    /// level, from the script.
    Return(i32),
    /// `exit [n]`: terminate the shell.
    Exit(i32),
}

/// The result of executing part of a program: either the exit status of the
/// executed straight-line code, or a [`Divert`] unwinding through it.
///
/// `?` propagates a `Divert` up through nested execution exactly the way it
/// propagates an `Err`, which is why the type alias is built on
/// [`std::ops::ControlFlow`] rather than a hand-rolled enum.
pub type ExecResult<T = i32> = std::ops::ControlFlow<Divert, T>;
