//! Scoped recording of newly created fields.
//!
//! While a scope is open every attached field's slug is recorded in it (and
//! in every enclosing scope). Closing a scope hands back what it recorded so
//! the form can apply a batch of properties to exactly those fields. Scopes
//! follow the call stack: they are opened and closed in LIFO order by
//! [`Form::run_buffered`](crate::Form::run_buffered).

/// Handle for an open scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

/// Stack of open recording scopes.
#[derive(Debug, Clone, Default)]
pub struct RowBuffer {
    scopes: Vec<Vec<String>>,
}

impl RowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new innermost scope.
    pub fn open(&mut self) -> ScopeId {
        self.scopes.push(Vec::new());
        ScopeId(self.scopes.len() - 1)
    }

    /// Records a slug in every open scope.
    pub fn record(&mut self, slug: &str) {
        for scope in &mut self.scopes {
            if !scope.iter().any(|s| s == slug) {
                scope.push(slug.to_string());
            }
        }
    }

    /// Closes `scope` (and anything still open inside it) and returns the
    /// slugs it recorded, in creation order.
    pub fn close(&mut self, scope: ScopeId) -> Vec<String> {
        if scope.0 >= self.scopes.len() {
            return Vec::new();
        }
        self.scopes.drain(scope.0..).next().unwrap_or_default()
    }

    /// Returns true while any scope is open.
    pub fn is_active(&self) -> bool {
        !self.scopes.is_empty()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
