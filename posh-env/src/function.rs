// This file is part of posh, a POSIX-style shell.

//! Named shell functions

use posh_syntax::{FunctionDef, Location};
use std::collections::HashMap;
use std::rc::Rc;

/// A defined function: its body plus whether it has been made read-only
///
/// The body is an `Rc<FunctionDef>` shared with whatever AST it was parsed
/// from, not an owned copy, so redefining one function never invalidates
/// another call site still executing the old definition.
#[derive(Clone, Debug)]
pub struct Function {
    pub def: Rc<FunctionDef>,
    pub read_only_location: Option<Location>,
}

impl Function {
    #[must_use]
    pub fn new(def: Rc<FunctionDef>) -> Self {
        Function {
            def,
            read_only_location: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }

    #[must_use]
    pub fn make_read_only(mut self, location: Location) -> Self {
        self.read_only_location = Some(location);
        self
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.def, &other.def)
    }
}

impl Eq for Function {}

/// Error from [`FunctionSet::define`]: the name is already a read-only function
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("cannot redefine read-only function `{name}`")]
pub struct DefineError {
    pub name: String,
    pub read_only_location: Location,
}

/// The set of functions currently defined
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FunctionSet {
    functions: HashMap<String, Rc<Function>>,
}

impl FunctionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rc<Function>> {
        self.functions.get(name)
    }

    /// Defines or redefines a function.
    ///
    /// # Errors
    /// Returns [`DefineError`] if a function of this name exists and is
    /// read-only.
    pub fn define(&mut self, def: Rc<FunctionDef>) -> Result<(), DefineError> {
        if let Some(existing) = self.functions.get(def.name.as_str()) {
            if let Some(loc) = &existing.read_only_location {
                return Err(DefineError {
                    name: def.name.clone(),
                    read_only_location: loc.clone(),
                });
            }
        }
        self.functions
            .insert(def.name.clone(), Rc::new(Function::new(def)));
        Ok(())
    }

    /// Removes a function definition, if any.
    pub fn unset(&mut self, name: &str) {
        self.functions.remove(name);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Function>> {
        self.functions.values()
    }
}
