// This file is part of posh, a POSIX-style shell.

//! The real [`ExecutorHost`]: runs pipeline stages as OS processes via
//! [`std::process::Command`].
//!
//! This is the one place in the whole workspace that actually forks a
//! process. Everything upstream of here (lexing, parsing, expansion,
//! executing the AST) only ever produces a fully resolved [`ResolvedCommand`]
//! and hands it across this boundary, mirroring `yash`'s own split between
//! its `System` trait and `RealSystem`.

use posh_exec::{ExecutorHost, ResolvedCommand};
use posh_syntax::RedirOp;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("cannot open '{target}' for redirection: {source}")]
    Redirection {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("redirection to file descriptor {0} is not supported")]
    UnsupportedFd(u32),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Runs pipeline stages as child processes, tracking a stack of in-memory
/// buffers that the innermost command substitution's stdout is captured
/// into instead of being inherited from the shell's own stdout.
#[derive(Default)]
pub struct RealHost {
    capture_stack: Vec<Vec<u8>>,
}

impl RealHost {
    #[must_use]
    pub fn new() -> Self {
        RealHost::default()
    }

    /// Builds a `Command` for one stage, applying its redirections.
    ///
    /// A redirection's target file is kept open as a plain `File` (rather
    /// than immediately converted to a `Stdio`) so a later `2>&1`/`1>&2` in
    /// the same command can duplicate it with `try_clone`. File descriptors
    /// beyond 0/1/2, and a dup operator with no matching file-backed
    /// redirection on its target fd, aren't representable through
    /// `std::process::Command` without raw `dup2` plumbing this workspace
    /// doesn't carry a dependency for, so those are rejected rather than
    /// silently ignored.
    fn build_command(stage: &ResolvedCommand, capturing: bool) -> Result<Command, HostError> {
        let mut command = Command::new(&stage.argv[0]);
        command.args(&stage.argv[1..]);
        for (name, value) in &stage.env_overrides {
            command.env(name, value);
        }

        let mut files: [Option<File>; 3] = [None, None, None];

        for redirection in &stage.redirections {
            let fd = redirection.fd;
            if fd > 2 {
                return Err(HostError::UnsupportedFd(fd));
            }
            let open = |opts: &OpenOptions| {
                opts.open(&redirection.target)
                    .map_err(|source| HostError::Redirection {
                        target: redirection.target.clone(),
                        source,
                    })
            };
            match redirection.op {
                RedirOp::FileIn => {
                    files[fd as usize] = Some(open(OpenOptions::new().read(true))?);
                }
                RedirOp::FileOut => {
                    files[fd as usize] =
                        Some(open(OpenOptions::new().write(true).create(true).truncate(true))?);
                }
                RedirOp::FileOutErr => {
                    let file = open(OpenOptions::new().write(true).create(true).truncate(true))?;
                    files[2] = Some(file.try_clone()?);
                    files[1] = Some(file);
                }
                RedirOp::Append => {
                    files[fd as usize] =
                        Some(open(OpenOptions::new().write(true).create(true).append(true))?);
                }
                RedirOp::DupOut | RedirOp::DupIn => {
                    let target_fd: usize = redirection
                        .target
                        .parse()
                        .map_err(|_| HostError::UnsupportedFd(fd))?;
                    if target_fd > 2 {
                        return Err(HostError::UnsupportedFd(target_fd as u32));
                    }
                    let source = files[target_fd]
                        .as_ref()
                        .ok_or(HostError::UnsupportedFd(fd))?
                        .try_clone()?;
                    files[fd as usize] = Some(source);
                }
            }
        }

        let [stdin, stdout, stderr] = files;
        if let Some(file) = stdin {
            command.stdin(Stdio::from(file));
        }
        match stdout {
            Some(file) => {
                command.stdout(Stdio::from(file));
            }
            None if capturing => {
                command.stdout(Stdio::piped());
            }
            None => {}
        }
        if let Some(file) = stderr {
            command.stderr(Stdio::from(file));
        }

        Ok(command)
    }
}

impl ExecutorHost for RealHost {
    type Error = HostError;

    fn run_pipeline(&mut self, stages: &[ResolvedCommand]) -> Result<i32, HostError> {
        let capturing = !self.capture_stack.is_empty();

        if stages.len() == 1 {
            let mut command = Self::build_command(&stages[0], capturing)?;
            let status = if capturing {
                let output = command
                    .output()
                    .map_err(|_| HostError::NotFound(stages[0].argv[0].clone()))?;
                self.capture_stack.last_mut().unwrap().extend(output.stdout);
                output.status
            } else {
                command
                    .status()
                    .map_err(|_| HostError::NotFound(stages[0].argv[0].clone()))?
            };
            return Ok(status.code().unwrap_or(128));
        }

        let mut children = Vec::with_capacity(stages.len());
        let mut previous_stdout = None;
        let last = stages.len() - 1;
        for (index, stage) in stages.iter().enumerate() {
            let mut command = Self::build_command(stage, false)?;
            if let Some(stdin) = previous_stdout.take() {
                command.stdin(stdin);
            }
            if index != last || capturing {
                command.stdout(Stdio::piped());
            }
            let mut child = command
                .spawn()
                .map_err(|_| HostError::NotFound(stage.argv[0].clone()))?;
            previous_stdout = child.stdout.take().map(Stdio::from);
            children.push(child);
        }

        let mut last_status = 0;
        for (index, mut child) in children.into_iter().enumerate() {
            if index == last && capturing {
                let mut buf = Vec::new();
                if let Some(mut stdout) = child.stdout.take() {
                    stdout.read_to_end(&mut buf)?;
                }
                let status = child.wait()?;
                self.capture_stack.last_mut().unwrap().extend(buf);
                last_status = status.code().unwrap_or(128);
            } else {
                let status = child.wait()?;
                if index == last {
                    last_status = status.code().unwrap_or(128);
                }
            }
        }
        Ok(last_status)
    }

    fn run_background(&mut self, stages: &[ResolvedCommand]) -> Result<(), HostError> {
        let mut previous_stdout = None;
        let last = stages.len() - 1;
        for (index, stage) in stages.iter().enumerate() {
            let mut command = Self::build_command(stage, false)?;
            if let Some(stdin) = previous_stdout.take() {
                command.stdin(stdin);
            }
            if index != last {
                command.stdout(Stdio::piped());
            }
            let mut child = command
                .spawn()
                .map_err(|_| HostError::NotFound(stage.argv[0].clone()))?;
            previous_stdout = child.stdout.take().map(Stdio::from);
            // Not waited on: the shell doesn't track a job table (out of
            // scope), so a backgrounded job becomes a detached process.
        }
        Ok(())
    }

    fn push_stdout_capture(&mut self) {
        self.capture_stack.push(Vec::new());
    }

    fn pop_stdout_capture(&mut self) -> Vec<u8> {
        self.capture_stack.pop().unwrap_or_default()
    }
}
