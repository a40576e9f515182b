//! Runtime scope chain.
//!
//! Environments are shared through `Rc<RefCell<_>>`: a block, a call frame
//! and every closure that captured a scope all hold the same cell, so an
//! assignment through one holder is seen by all of them.  A scope lives as
//! long as its last holder.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to an [`Environment`].
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// A root (global) environment.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child scope of `enclosing`.  The parent link never changes afterwards.
    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Is `name` bound in this scope itself (enclosing scopes are not searched)?
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Bind (or rebind) `name` in this scope.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup walking outwards.  Only used for globals, where the
    /// chain has length one, and as a fallback for unresolved names.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from the scope exactly `distance` hops out.
    pub fn get_at(&self, distance: usize, name: &str, line: usize) -> Result<Value> {
        if distance == 0 {
            return self.values.get(name).cloned().ok_or_else(|| {
                debug!("Resolved slot '{}' missing at runtime", name);
                LoxError::runtime(line, format!("Undefined variable '{}'.", name))
            });
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get_at(distance - 1, name, line),
            None => Err(LoxError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            )),
        }
    }

    /// Overwrite `name` in the scope exactly `distance` hops out.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Value) -> Result<()> {
        if distance == 0 {
            return match self.values.get_mut(&name.lexeme) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(undefined(name)),
            };
        }

        match &self.enclosing {
            Some(enclosing) => enclosing
                .borrow_mut()
                .assign_at(distance - 1, name, value),
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name.line, format!("Undefined variable '{}'.", name.lexeme))
}
