// This file is part of posh, a POSIX-style shell.

//! Shell variables, scoped by a stack of contexts
//!
//! A [`VariableSet`] holds a non-empty stack of [`Context`]s. The first
//! (base) context is always present; function calls and command-local
//! assignments push further contexts and pop them on return. Looking a
//! variable up walks the stack top-down, so an inner context's variable
//! hides an outer one of the same name without destroying it.

use posh_syntax::Location;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

/// The value and attributes of one shell variable
///
/// Arrays are out of scope here (see the workspace's design ledger); a
/// variable's value is always a plain string.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// `None` means declared (e.g. by `export foo`) but never assigned.
    pub value: Option<String>,
    pub last_assigned_location: Option<Location>,
    pub is_exported: bool,
    pub read_only_location: Option<Location>,
}

impl Variable {
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Variable {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn set_assigned_location(mut self, location: Location) -> Self {
        self.last_assigned_location = Some(location);
        self
    }

    #[must_use]
    pub fn export(mut self) -> Self {
        self.is_exported = true;
        self
    }

    #[must_use]
    pub fn make_read_only(mut self, location: Location) -> Self {
        self.read_only_location = Some(location);
        self
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }
}

/// The positional parameters (`$1`, `$2`, ..., `$#`, `$@`, `$*`) visible in a
/// [`Context::Regular`]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalParams {
    pub values: Vec<String>,
    pub last_modified_location: Option<Location>,
}

/// A level of the variable scope stack
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Context {
    /// An ordinary scope: the base context, or one pushed for a function
    /// call. Owns its own positional parameters.
    Regular { positional_params: PositionalParams },
    /// A short-lived scope for a command-local assignment prefix
    /// (`VAR=val cmd`), popped as soon as the command finishes.
    Volatile,
}

impl Default for Context {
    fn default() -> Self {
        Context::Regular {
            positional_params: PositionalParams::default(),
        }
    }
}

/// Which context an operation should target
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// The base context: visible everywhere, outlives any function call.
    Global,
    /// The innermost regular context: a function's local scope, or the base
    /// context if no function call is active.
    Local,
    /// The innermost context, which must be [`Context::Volatile`].
    Volatile,
}

/// Error returned by [`VariableSet::unset`] when the variable is read-only
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("cannot unset read-only variable `{name}`")]
pub struct UnsetError {
    pub name: String,
    pub read_only_location: Location,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct InContext {
    variable: Variable,
    context_index: usize,
}

/// The stack of variable contexts for one shell session
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableSet {
    all: HashMap<String, Vec<InContext>>,
    contexts: Vec<Context>,
    /// Bumped on every write (assignment, unset, a context push/pop that
    /// changes what's visible); [`Cache`](crate::Cache) keys its entries on
    /// this to know when they've gone stale.
    generation: u64,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            all: HashMap::new(),
            contexts: vec![Context::default()],
            generation: 0,
        }
    }
}

impl VariableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write generation, for keying [`Cache`](crate::Cache) entries.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn topmost_regular_index(&self) -> usize {
        self.contexts
            .iter()
            .rposition(|c| matches!(c, Context::Regular { .. }))
            .expect("the base context is always regular")
    }

    fn index_of(&self, scope: Scope) -> usize {
        match scope {
            Scope::Global => 0,
            Scope::Local => self.topmost_regular_index(),
            Scope::Volatile => self.contexts.len() - 1,
        }
    }

    /// Looks up a variable, visible from the topmost context down.
    #[must_use]
    pub fn get<N>(&self, name: &N) -> Option<&Variable>
    where
        String: Borrow<N>,
        N: Hash + Eq + ?Sized,
    {
        Some(&self.all.get(name)?.last()?.variable)
    }

    /// Looks up a variable, but only in contexts at or above `scope`.
    #[must_use]
    pub fn get_scoped<N>(&self, name: &N, scope: Scope) -> Option<&Variable>
    where
        String: Borrow<N>,
        N: Hash + Eq + ?Sized,
    {
        let index = self.index_of(scope);
        self.all
            .get(name)?
            .last()
            .filter(|v| v.context_index >= index)
            .map(|v| &v.variable)
    }

    /// Gets or creates a variable in the context selected by `scope`,
    /// returning a mutable handle to it.
    ///
    /// Panics if `scope` is [`Scope::Volatile`] and the topmost context
    /// isn't actually volatile.
    pub fn get_or_new(&mut self, name: impl Into<String>, scope: Scope) -> VariableRefMut<'_> {
        let name = name.into();
        if matches!(scope, Scope::Volatile) {
            assert!(
                matches!(self.contexts.last(), Some(Context::Volatile)),
                "Scope::Volatile requires a volatile context on top"
            );
        }
        let context_index = self.index_of(scope);
        let stack = match self.all.entry(name.clone()) {
            Vacant(v) => v.insert(Vec::new()),
            Occupied(o) => o.into_mut(),
        };
        if !matches!(stack.last(), Some(v) if v.context_index == context_index) {
            stack.push(InContext {
                variable: Variable::default(),
                context_index,
            });
        }
        VariableRefMut { name, set: self }
    }

    /// Removes a variable from the topmost context it's visible in.
    ///
    /// # Errors
    /// Returns [`UnsetError`] if the variable is read-only.
    pub fn unset<N>(&mut self, name: &N) -> Result<(), UnsetError>
    where
        String: Borrow<N>,
        N: Hash + Eq + ?Sized + ToString,
    {
        let Some(stack) = self.all.get_mut(name) else {
            return Ok(());
        };
        if let Some(top) = stack.last() {
            if let Some(loc) = &top.variable.read_only_location {
                return Err(UnsetError {
                    name: name.to_string(),
                    read_only_location: loc.clone(),
                });
            }
            stack.pop();
            self.generation += 1;
        }
        Ok(())
    }

    /// Pushes a new context and returns a guard that pops it when dropped.
    pub fn push_context(&mut self, context: Context) -> ContextGuard<'_> {
        self.contexts.push(context);
        self.generation += 1;
        ContextGuard { set: self }
    }

    /// Pushes a new context without borrowing a guard back.
    ///
    /// For callers that need the rest of `self`'s owner mutably borrowable
    /// while the context is open (a command-local assignment prefix spans an
    /// expansion call that takes the whole `ShellState`, not just
    /// `VariableSet`) and so can't hold a [`ContextGuard`]. Must be paired
    /// with a manual [`Self::pop_context`] on every exit path.
    pub fn push_context_only(&mut self, context: Context) {
        self.contexts.push(context);
        self.generation += 1;
    }

    /// Pops the topmost context. Pairs with [`Self::push_context_only`].
    pub fn pop_context(&mut self) {
        let popped = self.contexts.len() - 1;
        self.contexts.pop();
        for stack in self.all.values_mut() {
            if stack.last().is_some_and(|v| v.context_index == popped) {
                stack.pop();
            }
        }
        self.generation += 1;
    }

    /// Returns the positional parameters visible at `scope`.
    #[must_use]
    pub fn positional_params(&self, scope: Scope) -> &PositionalParams {
        let index = self.index_of(scope);
        match &self.contexts[self.regular_index_at_or_below(index)] {
            Context::Regular { positional_params } => positional_params,
            Context::Volatile => unreachable!("regular_index_at_or_below only returns Regular"),
        }
    }

    /// Returns a mutable reference to the positional parameters visible at
    /// `scope`.
    pub fn positional_params_mut(&mut self, scope: Scope) -> &mut PositionalParams {
        self.generation += 1;
        let index = self.index_of(scope);
        let regular = self.regular_index_at_or_below(index);
        match &mut self.contexts[regular] {
            Context::Regular { positional_params } => positional_params,
            Context::Volatile => unreachable!("regular_index_at_or_below only returns Regular"),
        }
    }

    fn regular_index_at_or_below(&self, index: usize) -> usize {
        self.contexts[..=index]
            .iter()
            .rposition(|c| matches!(c, Context::Regular { .. }))
            .expect("the base context is always regular")
    }

    /// Iterates over every variable currently visible (one entry per name,
    /// the topmost-context value), for building a child process's
    /// environment from the exported ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.all
            .iter()
            .filter_map(|(name, stack)| Some((name.as_str(), &stack.last()?.variable)))
    }
}

/// A mutable handle to a variable, returned by [`VariableSet::get_or_new`]
pub struct VariableRefMut<'a> {
    name: String,
    set: &'a mut VariableSet,
}

/// Error from [`VariableRefMut::assign`]: the variable is read-only
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("cannot assign to read-only variable `{name}`")]
pub struct AssignError {
    pub name: String,
    pub read_only_location: Location,
}

impl VariableRefMut<'_> {
    #[must_use]
    pub fn get(&self) -> &Variable {
        self.set
            .all
            .get(&self.name)
            .and_then(|s| s.last())
            .map(|v| &v.variable)
            .expect("get_or_new always leaves an entry behind")
    }

    fn get_mut(&mut self) -> &mut Variable {
        self.set.generation += 1;
        self.set
            .all
            .get_mut(&self.name)
            .and_then(|s| s.last_mut())
            .map(|v| &mut v.variable)
            .expect("get_or_new always leaves an entry behind")
    }

    /// Assigns a new value, failing if the variable is read-only.
    pub fn assign(
        &mut self,
        value: impl Into<String>,
        location: Option<Location>,
    ) -> Result<(), AssignError> {
        if let Some(loc) = self.get().read_only_location.clone() {
            return Err(AssignError {
                name: self.name.clone(),
                read_only_location: loc,
            });
        }
        let variable = self.get_mut();
        variable.value = Some(value.into());
        variable.last_assigned_location = location;
        Ok(())
    }

    #[must_use]
    pub fn export(mut self, export: bool) -> Self {
        self.get_mut().is_exported = export;
        self
    }

    #[must_use]
    pub fn make_read_only(mut self, location: Location) -> Self {
        self.get_mut().read_only_location = Some(location);
        self
    }
}

/// Guard returned by [`VariableSet::push_context`]; pops the context on drop.
pub struct ContextGuard<'a> {
    set: &'a mut VariableSet,
}

impl Deref for ContextGuard<'_> {
    type Target = VariableSet;
    fn deref(&self) -> &VariableSet {
        self.set
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut VariableSet {
        self.set
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.set.pop_context();
    }
}
