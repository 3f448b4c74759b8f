//! A form for free-standing field helpers.
//!
//! Template helpers that emit one field at a time need a form to hang the
//! fields on. [`FormContext`] owns that form explicitly and allows slugs to
//! be redefined, so re-running a helper replaces its field instead of
//! failing.

use crate::error::Result;
use crate::field::Field;
use crate::form::{Form, Placement};

#[derive(Debug)]
pub struct FormContext {
    form: Form,
}

impl FormContext {
    /// Wraps `form`, turning on field overwriting.
    pub fn new(mut form: Form) -> Self {
        form.set_allow_field_overwrite(true);
        Self { form }
    }

    /// Defines (or redefines) a field by kind name.
    pub fn field(&mut self, kind: &str, slug: &str, label: Option<&str>) -> Result<&mut Field> {
        self.form.add_kind(kind, slug, label, Placement::End)
    }

    /// Defines a field and returns its markup.
    pub fn emit(&mut self, kind: &str, slug: &str, label: Option<&str>) -> Result<String> {
        self.field(kind, slug, label)?;
        self.form.render_field(slug)
    }

    /// Markup for a previously defined field.
    pub fn render(&self, slug: &str) -> Result<String> {
        self.form.render_field(slug)
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn into_form(self) -> Form {
        self.form
    }
}
