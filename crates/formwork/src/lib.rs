#![forbid(unsafe_code)]
// Allow these clippy lints for builder-style API ergonomics
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::use_self)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::new_without_default)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::struct_excessive_bools)]

//! # Formwork
//!
//! Server-side HTML form construction.
//!
//! Formwork assembles a form declaratively (fields, rows, labels, options,
//! bound model data) and renders it through a pluggable [`Renderer`]:
//! - **Fields** with HTML attributes, typed properties, and composed
//!   bracketed submission names (`user[address][city]`)
//! - **Ordering** with insert-before/after and explicit reordering
//! - **Rows** built by buffering every field created inside a closure
//! - **Lifecycle events** for ad-hoc callbacks and [`Binder`] objects
//! - **Macros** and named field kinds for custom field types
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use formwork::{Element, Field, Form, Renderer};
//!
//! struct Plain;
//!
//! impl Renderer for Plain {
//!     fn is_valid_type(&self, t: &str) -> bool { t != "bogus" }
//!     fn form_open(&self, _: &Form) -> String { "<form>".into() }
//!     fn form_close(&self, _: &Form) -> String { "</form>".into() }
//!     fn row_open(&self, row: &Element, _: &[&Field]) -> String {
//!         format!("<div id=\"{}\">", row.id().unwrap_or_default())
//!     }
//!     fn row_close(&self, _: &Element, _: &[&Field]) -> String { "</div>".into() }
//!     fn field(&self, _: &Form, f: &Field) -> String {
//!         format!("<input name=\"{}\">", f.name().unwrap_or_default())
//!     }
//! }
//!
//! let mut form = Form::new(Rc::new(Plain));
//! form.add_field_name("user");
//! form.add_row(
//!     |form| {
//!         form.add("first", "text")?;
//!         form.add("last", "text")?;
//!         Ok(())
//!     },
//!     None,
//! )
//! .unwrap();
//!
//! let html = form.render().unwrap();
//! assert_eq!(
//!     html,
//!     "<div id=\"row-1\">\n<input name=\"user[first]\">\n<input name=\"user[last]\">\n</div>"
//! );
//! ```
//!
//! ## Builder
//!
//! [`FormBuilder`] holds named renderers, macros, field kinds, and listeners
//! shared by every form it creates. [`FormContext`] wraps a single form for
//! helpers that define fields one at a time.

pub mod attributes;
pub mod buffer;
pub mod builder;
pub mod config;
pub mod context;
pub mod element;
pub mod error;
pub mod events;
pub mod field;
pub mod form;
pub mod kinds;
pub mod macros;
pub mod model;
pub mod naming;
pub mod properties;
pub mod renderer;
pub mod table;

// Re-exports
pub use attributes::{AttrValue, AttributeBag, CLASS_ATTR};
pub use buffer::{RowBuffer, ScopeId};
pub use builder::FormBuilder;
pub use config::{BuilderConfig, ConfigLoadError, ConfigSaveError, FormOptions};
pub use context::FormContext;
pub use element::{CONTAINER_TAG, Element};
pub use error::{FormError, Result};
pub use events::{Binder, Callback, EventArgs, EventBus, Lifecycle};
pub use field::{Field, RAW_FIELD_TYPE};
pub use form::{ActionType, Form, FormAction, Placement};
pub use kinds::{FieldKind, FieldKinds};
pub use macros::{MacroFn, Macros};
pub use model::Model;
pub use naming::{BaseNames, NameSegment, OwnName};
pub use properties::{PropertyKey, PropertyStore, SelectOption, options_from_values};
pub use renderer::Renderer;
pub use table::{OrderedTable, TableError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::attributes::AttributeBag;
    pub use crate::builder::FormBuilder;
    pub use crate::element::Element;
    pub use crate::error::{FormError, Result};
    pub use crate::events::{Binder, EventArgs};
    pub use crate::field::Field;
    pub use crate::form::{Form, Placement};
    pub use crate::properties::SelectOption;
    pub use crate::renderer::Renderer;
}
