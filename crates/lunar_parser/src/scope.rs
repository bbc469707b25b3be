//! Lexical scope tracking.
//!
//! Each block scope is an ordered set of declared names. A child scope is
//! created as a copy of its parent, so name lookups never walk a chain.

use indexmap::IndexSet;

pub(crate) struct ScopeTracker {
    scopes: Vec<IndexSet<String>>,
    depth: usize,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self { scopes: vec![IndexSet::new()], depth: 0 }
    }

    /// Enter a new scope inheriting all declarations from the current one.
    pub fn create(&mut self) {
        let scope = self.scopes[self.depth].clone();
        self.depth += 1;
        self.scopes.push(scope);
        debug_assert_eq!(self.depth, self.scopes.len() - 1);
    }

    /// Exit and discard the current scope.
    pub fn destroy(&mut self) {
        self.scopes.pop();
        self.depth -= 1;
        debug_assert_eq!(self.depth, self.scopes.len() - 1);
    }

    /// Add a name to the current scope. Idempotent.
    pub fn add_name(&mut self, name: &str) {
        if !self.scopes[self.depth].contains(name) {
            self.scopes[self.depth].insert(name.to_string());
        }
    }

    /// Whether the name is declared in the current scope (including
    /// everything inherited from enclosing scopes).
    pub fn has_name(&self, name: &str) -> bool {
        self.scopes[self.depth].contains(name)
    }
}
