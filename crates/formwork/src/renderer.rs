//! The pluggable markup backend.

use crate::element::Element;
use crate::field::Field;
use crate::form::Form;

/// Produces markup for a form, its rows, and its fields.
///
/// A form holds one renderer and calls it during
/// [`Form::render`](crate::Form::render) and friends. Implementations
/// decide which field types they can render; a form refuses to attach a
/// field whose type the renderer rejects (unless the type is `raw` or a
/// registered macro).
pub trait Renderer {
    /// Returns true if this renderer can render fields of `field_type`.
    fn is_valid_type(&self, field_type: &str) -> bool;

    /// The form's opening markup.
    fn form_open(&self, form: &Form) -> String;

    /// The form's closing markup.
    fn form_close(&self, form: &Form) -> String;

    /// Opening markup for a row wrapper holding `fields`.
    fn row_open(&self, row: &Element, fields: &[&Field]) -> String;

    /// Closing markup for a row wrapper.
    fn row_close(&self, row: &Element, fields: &[&Field]) -> String;

    /// Markup for one field. The form is passed for model lookup and
    /// form-level options.
    fn field(&self, form: &Form, field: &Field) -> String;
}
