// This file is part of posh, a POSIX-style shell.

//! Expansion cache: memoizes variable reads and arithmetic evaluations
//! against [`VariableSet`](crate::VariableSet)'s generation counter.
//!
//! Both maps are wiped the next time they're consulted after the
//! generation has moved on, so a write anywhere in the variable set
//! (assignment, unset, a context push/pop changing what's visible)
//! invalidates every entry rather than just the one that changed; that
//! matches the coarse, name-and-source-keyed cache the shell's expansion
//! hot path wants for tight loops, not a precise dependency tracker.

use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
struct CacheState {
    generation: u64,
    variables: HashMap<String, Option<String>>,
    arith: HashMap<String, i64>,
}

/// Interior-mutable cache carried on [`ShellState`](crate::ShellState) so it
/// can be consulted from the read-only lookup paths that only ever see
/// `&ShellState`.
#[derive(Clone, Debug, Default)]
pub struct Cache(RefCell<CacheState>);

impl Cache {
    fn refresh(&self, current_generation: u64) {
        let mut state = self.0.borrow_mut();
        if state.generation != current_generation {
            state.variables.clear();
            state.arith.clear();
            state.generation = current_generation;
        }
    }

    /// Returns the cached value of variable `name` if the cache is still
    /// current at `current_generation`, without calling into the variable
    /// set at all on a hit.
    #[must_use]
    pub fn cached_variable(&self, name: &str, current_generation: u64) -> Option<Option<String>> {
        self.refresh(current_generation);
        self.0.borrow().variables.get(name).cloned()
    }

    /// Remembers `value` as the result of looking up `name` at
    /// `current_generation`.
    pub fn store_variable(&self, name: &str, current_generation: u64, value: Option<String>) {
        self.refresh(current_generation);
        self.0.borrow_mut().variables.insert(name.to_string(), value);
    }

    /// Returns the cached result of evaluating arithmetic `source` if the
    /// cache is still current at `current_generation`.
    #[must_use]
    pub fn cached_arith(&self, source: &str, current_generation: u64) -> Option<i64> {
        self.refresh(current_generation);
        self.0.borrow().arith.get(source).copied()
    }

    /// Remembers `value` as the result of evaluating `source` at
    /// `current_generation`.
    pub fn store_arith(&self, source: &str, current_generation: u64, value: i64) {
        self.refresh(current_generation);
        self.0.borrow_mut().arith.insert(source.to_string(), value);
    }
}
