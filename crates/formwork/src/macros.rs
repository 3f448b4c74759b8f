//! Named custom field renderers.
//!
//! A macro renders fields whose type equals the macro's name, bypassing the
//! active renderer's own dispatch. Each macro may carry a one-shot
//! initializer (loading scripts, registering assets) that runs right before
//! the macro's first invocation and never again.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{FormError, Result};
use crate::field::Field;
use crate::form::Form;
use crate::renderer::Renderer;

/// A macro's render function.
pub type MacroFn = Rc<dyn Fn(&Form, &Field, &dyn Renderer) -> String>;

type Initializer = Box<dyn FnOnce()>;

struct MacroEntry {
    render: MacroFn,
    init: RefCell<Option<Initializer>>,
}

/// Shared macro registry.
///
/// Clones share the same registry, so a macro registered on a builder is
/// visible to every form it created, before or after registration.
#[derive(Clone, Default)]
pub struct Macros {
    entries: Rc<RefCell<HashMap<String, Rc<MacroEntry>>>>,
}

impl fmt::Debug for Macros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        let mut names: Vec<_> = entries.keys().cloned().collect();
        names.sort_unstable();
        f.debug_struct("Macros").field("names", &names).finish()
    }
}

impl Macros {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `render` under `name`, replacing any previous macro of
    /// that name.
    pub fn add<F>(&self, name: &str, render: F)
    where
        F: Fn(&Form, &Field, &dyn Renderer) -> String + 'static,
    {
        self.insert(name, Rc::new(render), None);
    }

    /// Registers a macro with an initializer that runs once, before the
    /// first call.
    pub fn add_with_init<F, I>(&self, name: &str, render: F, init: I)
    where
        F: Fn(&Form, &Field, &dyn Renderer) -> String + 'static,
        I: FnOnce() + 'static,
    {
        self.insert(name, Rc::new(render), Some(Box::new(init)));
    }

    fn insert(&self, name: &str, render: MacroFn, init: Option<Initializer>) {
        let entry = MacroEntry {
            render,
            init: RefCell::new(init),
        };
        self.entries.borrow_mut().insert(name.to_string(), Rc::new(entry));
        debug!(macro_name = name, "Macro registered");
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    pub fn remove(&self, name: &str) -> bool {
        self.entries.borrow_mut().remove(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.borrow().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Invokes the macro `name`, running its initializer first if it has
    /// not run yet.
    pub fn call(&self, name: &str, form: &Form, field: &Field, renderer: &dyn Renderer) -> Result<String> {
        // Release the registry borrow before running user code, which may
        // register further macros.
        let entry = self
            .entries
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::MacroNotFound(name.to_string()))?;

        let init = entry.init.borrow_mut().take();
        if let Some(init) = init {
            debug!(macro_name = name, "Running macro initializer");
            init();
        }
        Ok((entry.render)(form, field, renderer))
    }
}
