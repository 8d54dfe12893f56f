// This file is part of posh, a POSIX-style shell.

//! The tree-walking executor
//!
//! One [`Executor`] borrows the shell's mutable state and its host for the
//! duration of a single `exec_list` call (or less, for a nested one inside a
//! command substitution or subshell). It never touches the filesystem or a
//! process table directly; every externally visible effect goes through
//! [`ExecutorHost`].

use crate::command_subst::Subst;
use crate::divert::{Divert, ExecResult};
use crate::error::ExecError;
use crate::host::{ExecutorHost, ResolvedCommand, ResolvedRedirection};
use posh_env::{Context, Scope, ShellState};
use posh_expand::attr::AttrChar;
use posh_fnmatch::{Config, Pattern, PatternChar};
use posh_quote::quote;
use posh_syntax::{
    AndOrList, CaseClause, Command, CompoundCommand, Connector, ForClause, IfClause, Item,
    List, LoopClause, Pipeline, Redirection, SimpleCommand, Terminator, Word,
};
use std::ops::ControlFlow;

pub struct Executor<'a, H: ExecutorHost> {
    pub state: &'a mut ShellState,
    pub host: &'a mut H,
    /// Redirections attached to an enclosing compound command (`{ ...; } >
    /// f`), applied to every simple command run underneath it. Restored by
    /// truncating back to a saved length rather than an RAII guard, since a
    /// `Divert` can unwind past the point that would otherwise pop it.
    ambient_redirections: Vec<Redirection>,
}

impl<'a, H: ExecutorHost> Executor<'a, H> {
    pub fn new(state: &'a mut ShellState, host: &'a mut H) -> Self {
        Executor {
            state,
            host,
            ambient_redirections: Vec::new(),
        }
    }

    /// Runs a whole program, applying `errexit` at each top-level item.
    pub fn exec_list(&mut self, list: &List) -> ExecResult {
        if !self.state.options.exec() {
            return ControlFlow::Continue(0);
        }
        self.exec_list_inner(list, true)
    }

    /// Runs a compound-list as an `if`/`while`/`until` condition: the same
    /// statements, but a non-zero status here never trips `errexit`.
    fn exec_condition(&mut self, list: &List) -> ExecResult {
        self.exec_list_inner(list, false)
    }

    fn exec_list_inner(&mut self, list: &List, apply_errexit: bool) -> ExecResult {
        let mut status = 0;
        for item in &list.items {
            status = self.exec_item(item)?;
            if apply_errexit && self.state.options.errexit() && status != 0 {
                return ControlFlow::Break(Divert::Exit(status));
            }
        }
        ControlFlow::Continue(status)
    }

    fn exec_item(&mut self, item: &Item) -> ExecResult {
        match item.terminator {
            Terminator::Sequential => self.exec_and_or(&item.and_or),
            Terminator::Background => self.exec_and_or_background(&item.and_or),
        }
    }

    fn exec_and_or(&mut self, and_or: &AndOrList) -> ExecResult {
        let mut status = self.exec_pipeline(&and_or.first)?;
        for (connector, pipeline) in &and_or.rest {
            let run_next = match connector {
                Connector::And => status == 0,
                Connector::Or => status != 0,
            };
            if run_next {
                status = self.exec_pipeline(pipeline)?;
            }
        }
        ControlFlow::Continue(status)
    }

    /// `&`: per the resource model, a background job gets its own process
    /// group and never blocks the caller. An and-or list with `&&`/`||`
    /// members backgrounded as a whole (`a && b &`) is rare enough that we
    /// just run it synchronously rather than teach the host to background a
    /// multi-stage decision tree.
    fn exec_and_or_background(&mut self, and_or: &AndOrList) -> ExecResult {
        if !and_or.rest.is_empty() {
            log::warn!("backgrounding a compound `&&`/`||` list runs it synchronously");
            return self.exec_and_or(and_or);
        }
        match self.resolve_pipeline_stages(&and_or.first) {
            Ok(stages) => {
                if let Err(e) = self.host.run_background(&stages) {
                    log::error!("{e}");
                }
            }
            Err(e) => log::error!("{e}"),
        }
        self.state.last_exit_status = 0;
        ControlFlow::Continue(0)
    }

    fn exec_pipeline(&mut self, pipeline: &Pipeline) -> ExecResult {
        let raw_status = if pipeline.commands.len() == 1 {
            self.exec_command(&pipeline.commands[0])?
        } else {
            match self.resolve_pipeline_stages(pipeline) {
                Ok(stages) => match self.host.run_pipeline(&stages) {
                    Ok(status) => status,
                    Err(e) => {
                        log::error!("{e}");
                        127
                    }
                },
                Err(e) => {
                    log::error!("{e}");
                    1
                }
            }
        };
        let status = if pipeline.negated {
            i32::from(raw_status != 0)
        } else {
            raw_status
        };
        self.state.last_exit_status = status;
        ControlFlow::Continue(status)
    }

    /// Resolves every stage of a pipeline to argv form for the host.
    ///
    /// Only plain simple commands can be non-terminal pipeline stages: a
    /// function or builtin would need its own in-process stdout redirected
    /// into a pipe, which would mean forking the executor itself, something
    /// this crate leaves to a real OS process per stage instead.
    fn resolve_pipeline_stages(&mut self, pipeline: &Pipeline) -> Result<Vec<ResolvedCommand>, ExecError> {
        let mut stages = Vec::with_capacity(pipeline.commands.len());
        for command in &pipeline.commands {
            let Command::Simple(simple) = command else {
                return Err(ExecError::Host(
                    "only simple commands may appear in a multi-stage pipeline".to_string(),
                ));
            };
            let mut env_overrides = Vec::new();
            for assignment in &simple.assignments {
                let value = self.expand_scalar(&assignment.value)?;
                env_overrides.push((assignment.name.clone(), value));
            }
            let mut argv = Vec::new();
            for word in &simple.words {
                argv.extend(self.expand_fields(word)?);
            }
            let redirections = self.resolve_redirections(&simple.redirections)?;
            stages.push(ResolvedCommand {
                argv,
                env_overrides,
                redirections,
            });
        }
        Ok(stages)
    }

    fn exec_command(&mut self, command: &Command) -> ExecResult {
        match command {
            Command::Simple(simple) => self.exec_simple(simple),
            Command::Compound {
                command,
                redirections,
                ..
            } => {
                let saved_len = self.ambient_redirections.len();
                self.ambient_redirections.extend(redirections.iter().cloned());
                let result = self.exec_compound(command);
                self.ambient_redirections.truncate(saved_len);
                result
            }
            Command::Function(def) => {
                match self.state.functions.define(std::rc::Rc::new(def.clone())) {
                    Ok(()) => ControlFlow::Continue(0),
                    Err(e) => {
                        log::error!("{e}");
                        ControlFlow::Continue(1)
                    }
                }
            }
        }
    }

    fn exec_compound(&mut self, command: &CompoundCommand) -> ExecResult {
        match command {
            CompoundCommand::If(clause) => self.exec_if(clause),
            CompoundCommand::While(clause) => self.exec_loop(clause),
            CompoundCommand::For(clause) => self.exec_for(clause),
            CompoundCommand::Case(clause) => self.exec_case(clause),
            CompoundCommand::Brace(list) => self.exec_list(list),
            CompoundCommand::Subshell(list) => self.exec_subshell(list),
        }
    }

    fn exec_if(&mut self, clause: &IfClause) -> ExecResult {
        let status = self.exec_condition(&clause.condition)?;
        if status == 0 {
            return self.exec_list(&clause.body);
        }
        for (condition, body) in &clause.elifs {
            let status = self.exec_condition(condition)?;
            if status == 0 {
                return self.exec_list(body);
            }
        }
        match &clause.else_branch {
            Some(body) => self.exec_list(body),
            None => ControlFlow::Continue(0),
        }
    }

    fn exec_loop(&mut self, clause: &LoopClause) -> ExecResult {
        let mut status = 0;
        loop {
            let cond_status = self.exec_condition(&clause.condition)?;
            let keep_going = (cond_status == 0) != clause.negate_condition;
            if !keep_going {
                break;
            }
            match unwind_loop_body(self.exec_list(&clause.body))? {
                Some(s) => status = s,
                None => break,
            }
        }
        ControlFlow::Continue(status)
    }

    fn exec_for(&mut self, clause: &ForClause) -> ExecResult {
        let values = match &clause.words {
            Some(words) => {
                let mut values = Vec::new();
                for word in words {
                    match self.expand_fields(word) {
                        Ok(fields) => values.extend(fields),
                        Err(e) => {
                            log::error!("{e}");
                            return ControlFlow::Continue(1);
                        }
                    }
                }
                values
            }
            None => self.state.positional_params().to_vec(),
        };

        let mut status = 0;
        for value in values {
            if let Err(e) = self
                .state
                .variables
                .get_or_new(clause.name.clone(), Scope::Local)
                .assign(value, Some(clause.location.clone()))
            {
                log::error!("{e}");
                return ControlFlow::Continue(1);
            }
            match unwind_loop_body(self.exec_list(&clause.body))? {
                Some(s) => status = s,
                None => break,
            }
        }
        ControlFlow::Continue(status)
    }

    fn exec_case(&mut self, clause: &CaseClause) -> ExecResult {
        let subject = match self.expand_scalar(&clause.subject) {
            Ok(s) => s,
            Err(e) => {
                log::error!("{e}");
                return ControlFlow::Continue(1);
            }
        };
        for item in &clause.items {
            for pattern_word in &item.patterns {
                let chars = match self.expand_attr_chars(pattern_word) {
                    Ok(c) => c,
                    Err(e) => {
                        log::error!("{e}");
                        return ControlFlow::Continue(1);
                    }
                };
                match compile_pattern(&chars) {
                    Ok(pattern) if pattern.is_match(&subject) => {
                        return self.exec_list(&item.body);
                    }
                    Ok(_) => {}
                    Err(message) => {
                        log::error!("{message}");
                        return ControlFlow::Continue(1);
                    }
                }
            }
        }
        ControlFlow::Continue(0)
    }

    /// `(list)`: a reserved extension point. Runs against a cloned snapshot
    /// of the state so nothing inside it (variable assignments, function
    /// definitions, positional parameters) is visible once it returns,
    /// matching a forked child's isolation without an actual `fork`.
    fn exec_subshell(&mut self, list: &List) -> ExecResult {
        let mut sub_state = self.state.clone();
        let mut sub = Executor::new(&mut sub_state, &mut *self.host);
        let result = sub.exec_list(list);
        match result {
            ControlFlow::Continue(status) => {
                self.state.last_exit_status = status;
                ControlFlow::Continue(status)
            }
            ControlFlow::Break(Divert::Exit(status)) => ControlFlow::Break(Divert::Exit(status)),
            // `return`/`break`/`continue` can't escape a subshell boundary
            // into the parent's control flow; report them as a plain status.
            ControlFlow::Break(Divert::Return(status)) => {
                self.state.last_exit_status = status;
                ControlFlow::Continue(status)
            }
            ControlFlow::Break(Divert::Break { .. } | Divert::Continue { .. }) => {
                self.state.last_exit_status = 0;
                ControlFlow::Continue(0)
            }
        }
    }

    /// A bare assignment list (`X=1 Y=2`, no command word) assigns into the
    /// current scope directly and permanently; a prefix on an actual command
    /// (`X=1 echo $X`) only shadows for that command's duration, so the two
    /// cases push a different (or no) context.
    fn exec_simple(&mut self, simple: &SimpleCommand) -> ExecResult {
        if simple.words.is_empty() {
            return self.exec_bare_assignments(simple);
        }
        let has_prefix = !simple.assignments.is_empty();
        if has_prefix {
            self.state.variables.push_context_only(Context::Volatile);
        }
        let result = self.exec_command_simple(simple);
        if has_prefix {
            self.state.variables.pop_context();
        }
        result
    }

    fn exec_bare_assignments(&mut self, simple: &SimpleCommand) -> ExecResult {
        for assignment in &simple.assignments {
            let value = match self.expand_scalar(&assignment.value) {
                Ok(v) => v,
                Err(e) => {
                    log::error!("{e}");
                    return ControlFlow::Continue(1);
                }
            };
            if let Err(e) = self.assign(assignment, Scope::Local, value) {
                log::error!("{e}");
                return ControlFlow::Continue(1);
            }
        }
        ControlFlow::Continue(0)
    }

    fn assign(
        &mut self,
        assignment: &posh_syntax::Assignment,
        scope: Scope,
        value: String,
    ) -> Result<(), posh_env::AssignError> {
        self.state
            .variables
            .get_or_new(assignment.name.clone(), scope)
            .assign(value, Some(assignment.location.clone()))?;
        if self.state.options.all_export() {
            self.state
                .variables
                .get_or_new(assignment.name.clone(), scope)
                .export(true);
        }
        Ok(())
    }

    /// Runs a simple command that has at least one word. Any prefix
    /// assignments have already been given a [`Context::Volatile`] to land
    /// in by the caller.
    fn exec_command_simple(&mut self, simple: &SimpleCommand) -> ExecResult {
        let scope = if simple.assignments.is_empty() {
            Scope::Local
        } else {
            Scope::Volatile
        };

        let mut env_overrides = Vec::with_capacity(simple.assignments.len());
        for assignment in &simple.assignments {
            let value = match self.expand_scalar(&assignment.value) {
                Ok(v) => v,
                Err(e) => {
                    log::error!("{e}");
                    return ControlFlow::Continue(1);
                }
            };
            if let Err(e) = self.assign(assignment, scope, value.clone()) {
                log::error!("{e}");
                return ControlFlow::Continue(1);
            }
            env_overrides.push((assignment.name.clone(), value));
        }

        let redirections = match self.resolve_redirections(&simple.redirections) {
            Ok(r) => r,
            Err(e) => {
                log::error!("{e}");
                return ControlFlow::Continue(1);
            }
        };

        let mut argv = Vec::new();
        for word in &simple.words {
            match self.expand_fields(word) {
                Ok(fields) => argv.extend(fields),
                Err(e) => {
                    log::error!("{e}");
                    return ControlFlow::Continue(1);
                }
            }
        }
        if argv.is_empty() {
            return ControlFlow::Continue(0);
        }

        if self.state.options.xtrace() {
            // Each word is re-quoted so a trace line stays unambiguous (and
            // reusable as input) even when an argument contains spaces or
            // shell metacharacters; `argv.join(" ")` alone would blur field
            // boundaries back together.
            let traced = argv.iter().map(|a| quote(a)).collect::<Vec<_>>().join(" ");
            log::debug!("+ {traced}");
        }

        if let Some(result) = dispatch_control_command(&argv, self.state.last_exit_status) {
            return result;
        }

        let name = argv[0].clone();
        if let Some(function) = self.state.functions.get(&name).cloned() {
            return self.call_function(&function, &argv);
        }
        if let Some(builtin) = self.host.lookup_builtin(&name) {
            let status = builtin(self, &argv);
            self.state.last_exit_status = status;
            return ControlFlow::Continue(status);
        }

        let resolved = ResolvedCommand {
            argv,
            env_overrides,
            redirections,
        };
        match self.host.run_pipeline(std::slice::from_ref(&resolved)) {
            Ok(status) => {
                self.state.last_exit_status = status;
                ControlFlow::Continue(status)
            }
            Err(e) => {
                log::error!("{e}");
                self.state.last_exit_status = 127;
                ControlFlow::Continue(127)
            }
        }
    }

    fn call_function(&mut self, function: &posh_env::Function, argv: &[String]) -> ExecResult {
        self.state.variables.push_context_only(Context::Regular {
            positional_params: posh_env::PositionalParams {
                values: argv[1..].to_vec(),
                last_modified_location: None,
            },
        });
        let saved_name = std::mem::replace(&mut self.state.shell_name, argv[0].clone());

        let body = std::rc::Rc::clone(&function.def.body);
        let result = self.exec_command(&body);

        self.state.shell_name = saved_name;
        self.state.variables.pop_context();

        match result {
            ControlFlow::Continue(status) => {
                self.state.last_exit_status = status;
                ControlFlow::Continue(status)
            }
            ControlFlow::Break(Divert::Return(status)) => {
                self.state.last_exit_status = status;
                ControlFlow::Continue(status)
            }
            other @ ControlFlow::Break(_) => other,
        }
    }

    fn resolve_redirections(
        &mut self,
        own: &[Redirection],
    ) -> Result<Vec<ResolvedRedirection>, ExecError> {
        let ambient = self.ambient_redirections.clone();
        let mut resolved = Vec::with_capacity(ambient.len() + own.len());
        for redirection in ambient.iter().chain(own.iter()) {
            let target = self.expand_scalar(&redirection.target)?;
            resolved.push(ResolvedRedirection {
                fd: redirection.fd,
                op: redirection.op,
                target,
            });
        }
        Ok(resolved)
    }

    fn expand_fields(&mut self, word: &Word) -> Result<Vec<String>, ExecError> {
        let mut subst = Subst {
            host: &mut *self.host,
            base_state: self.state.clone(),
        };
        Ok(posh_expand::expand_word(word, self.state, &mut subst)?)
    }

    fn expand_scalar(&mut self, word: &Word) -> Result<String, ExecError> {
        let mut subst = Subst {
            host: &mut *self.host,
            base_state: self.state.clone(),
        };
        Ok(posh_expand::expand_word_scalar(word, self.state, &mut subst)?)
    }

    fn expand_attr_chars(&mut self, word: &Word) -> Result<Vec<AttrChar>, ExecError> {
        let mut subst = Subst {
            host: &mut *self.host,
            base_state: self.state.clone(),
        };
        Ok(posh_expand::expand_word_attr_chars(word, self.state, &mut subst)?)
    }
}

/// Interprets a loop body's outcome, one level of `break`/`continue` nesting
/// at a time. `Some(status)` means keep looping with this status recorded;
/// `None` means the loop was broken out of.
fn unwind_loop_body(outcome: ExecResult) -> ControlFlow<Divert, Option<i32>> {
    match outcome {
        ControlFlow::Continue(status) => ControlFlow::Continue(Some(status)),
        ControlFlow::Break(Divert::Break { count: 0 }) => ControlFlow::Continue(None),
        ControlFlow::Break(Divert::Break { count }) => {
            ControlFlow::Break(Divert::Break { count: count - 1 })
        }
        ControlFlow::Break(Divert::Continue { count: 0 }) => ControlFlow::Continue(Some(0)),
        ControlFlow::Break(Divert::Continue { count }) => {
            ControlFlow::Break(Divert::Continue { count: count - 1 })
        }
        ControlFlow::Break(divert @ (Divert::Return(_) | Divert::Exit(_))) => {
            ControlFlow::Break(divert)
        }
    }
}

/// `break`, `continue`, `return` and `exit` are special builtins: they must
/// run in the executor's own frame to produce a [`Divert`], something an
/// [`crate::host::Builtin`] (a plain `fn(...) -> i32`) can't express. Other
/// builtins are this crate's host's business; these four aren't, since no
/// host could implement them without reaching back into the executor.
fn dispatch_control_command(argv: &[String], last_status: i32) -> Option<ExecResult> {
    let numeric_arg = |default: i32| -> i32 {
        argv.get(1).and_then(|s| s.parse().ok()).unwrap_or(default)
    };
    match argv[0].as_str() {
        "break" => {
            let count = numeric_arg(1).max(1) as u32 - 1;
            Some(ControlFlow::Break(Divert::Break { count }))
        }
        "continue" => {
            let count = numeric_arg(1).max(1) as u32 - 1;
            Some(ControlFlow::Break(Divert::Continue { count }))
        }
        "return" => Some(ControlFlow::Break(Divert::Return(numeric_arg(last_status)))),
        "exit" => Some(ControlFlow::Break(Divert::Exit(numeric_arg(last_status)))),
        _ => None,
    }
}

fn compile_pattern(chars: &[AttrChar]) -> Result<Pattern, String> {
    let source: Vec<PatternChar> = chars
        .iter()
        .map(|c| {
            if c.quoted {
                PatternChar::Literal(c.value)
            } else {
                PatternChar::Normal(c.value)
            }
        })
        .collect();
    Pattern::with_config(source, Config::full_match()).map_err(|e| e.to_string())
}
