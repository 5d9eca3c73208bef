//! Scope-local name bindings, built while walking a file front to back.

use std::collections::HashMap;

use crate::syntax::CallSite;

/// What is known about a local name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Declared without a value (`var rows *sql.Rows`)
    Declared,
    /// Holds the result of exactly one call
    Defined(CallSite),
    /// Parameter, non-call value, or assigned more than once
    Opaque,
}

/// Stack of lexical scopes, innermost last
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, Binding>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Whether `name` is declared in the innermost scope
    pub fn declared_here(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    /// Declare `name` in the innermost scope. The first declaration wins.
    pub fn declare(&mut self, name: &str, binding: Binding) {
        if name == "_" {
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.entry(name.to_string()).or_insert(binding);
        }
    }

    /// Record an assignment to an existing name.
    ///
    /// A declared-only name takes on its first assigned value; a name that
    /// already has a value no longer has a unique definition.
    pub fn assign(&mut self, name: &str, value: Binding) {
        let Some(slot) = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
        else {
            return;
        };
        *slot = match slot {
            Binding::Declared => value,
            Binding::Defined(_) | Binding::Opaque => Binding::Opaque,
        };
    }

    /// Innermost binding for `name`
    pub fn resolve(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// The call that uniquely defines `name`, if any
    pub fn producer(&self, name: &str) -> Option<&CallSite> {
        match self.resolve(name)? {
            Binding::Defined(call) => Some(call),
            Binding::Declared | Binding::Opaque => None,
        }
    }
}
