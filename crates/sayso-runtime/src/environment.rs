//! Lexically chained scopes
//!
//! An `Environment` is a mutable name→value table with an optional link
//! to an enclosing environment. Nodes are shared through
//! `Rc<RefCell<…>>`: the frame that created an environment and every
//! closure that captured it keep it alive together.
//!
//! New environments are created at exactly two points: named-function
//! invocation and closure invocation. Conditional, loop, and try/catch
//! bodies run in the environment of their enclosing statement list.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A single scope level with an optional enclosing scope
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Create a root environment
    pub fn new() -> Self {
        Default::default()
    }

    /// Create an environment chained to an enclosing one
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Look a name up, walking outward through the chain.
    /// `None` means the chain is exhausted, an unbound-name failure at
    /// the caller's discretion.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .enclosing
                .as_ref()
                .and_then(|outer| outer.borrow().get(name)),
        }
    }

    /// Bind a name in this level only. An existing binding of the same
    /// name in an outer level is shadowed, never mutated.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Membership test for this level only, never the outer chain.
    /// Used exclusively by template interpolation, which deliberately
    /// does not fall back to outer scopes.
    pub fn contains_local(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}
