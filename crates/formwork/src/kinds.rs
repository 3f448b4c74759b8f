//! Named field kinds for dynamic field creation.
//!
//! A kind maps a short name (`"submit"`, `"hidden"`) to a field type plus a
//! configuration step applied right after the field is attached.
//! [`Form::add_kind`](crate::Form::add_kind) resolves names through this
//! registry; names with no registered kind are used as the field type
//! directly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::field::{Field, RAW_FIELD_TYPE};

/// Configuration applied to a freshly attached field.
pub type Configure = Rc<dyn Fn(&mut Field)>;

/// A registered kind.
#[derive(Clone)]
pub struct FieldKind {
    field_type: String,
    configure: Option<Configure>,
}

impl FieldKind {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            configure: None,
        }
    }

    /// Adds a configuration step.
    pub fn with<F: Fn(&mut Field) + 'static>(mut self, configure: F) -> Self {
        self.configure = Some(Rc::new(configure));
        self
    }

    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    pub(crate) fn configure(&self, field: &mut Field) {
        if let Some(configure) = &self.configure {
            configure(field);
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldKind")
            .field("field_type", &self.field_type)
            .field("configured", &self.configure.is_some())
            .finish()
    }
}

/// Shared kind registry. Clones share state.
#[derive(Clone, Default)]
pub struct FieldKinds {
    kinds: Rc<RefCell<HashMap<String, FieldKind>>>,
}

impl fmt::Debug for FieldKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.kinds.borrow().keys().cloned().collect();
        names.sort_unstable();
        f.debug_struct("FieldKinds").field("names", &names).finish()
    }
}

impl FieldKinds {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `submit`, `hidden`, and `raw` kinds.
    ///
    /// `submit` defaults its label to "Submit"; `hidden` and `raw` render
    /// without a container.
    pub fn with_builtins() -> Self {
        let kinds = Self::new();
        kinds.register(
            "submit",
            FieldKind::new("submit").with(|field| {
                if field.properties().label().is_none() {
                    field.label("Submit");
                }
            }),
        );
        kinds.register(
            "hidden",
            FieldKind::new("hidden").with(|field| {
                field.no_container();
            }),
        );
        kinds.register(
            RAW_FIELD_TYPE,
            FieldKind::new(RAW_FIELD_TYPE).with(|field| {
                field.no_container();
            }),
        );
        kinds
    }

    /// Registers (or replaces) a kind.
    pub fn register(&self, name: &str, kind: FieldKind) {
        self.kinds.borrow_mut().insert(name.to_string(), kind);
    }

    pub fn get(&self, name: &str) -> Option<FieldKind> {
        self.kinds.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.borrow().contains_key(name)
    }

    /// The field type `name` resolves to.
    pub fn resolve_type(&self, name: &str) -> String {
        self.get(name)
            .map_or_else(|| name.to_string(), |kind| kind.field_type().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let kinds = FieldKinds::with_builtins();
        let submit = kinds.get("submit").unwrap();
        let mut field = Field::new("go", submit.field_type());
        submit.configure(&mut field);
        assert_eq!(field.properties().label(), Some("Submit"));

        let hidden = kinds.get("hidden").unwrap();
        let mut field = Field::new("token", "hidden");
        hidden.configure(&mut field);
        assert!(field.properties().container().is_none());
    }

    #[test]
    fn test_submit_keeps_explicit_label() {
        let kinds = FieldKinds::with_builtins();
        let mut field = Field::new("go", "submit");
        field.label("Send");
        kinds.get("submit").unwrap().configure(&mut field);
        assert_eq!(field.properties().label(), Some("Send"));
    }

    #[test]
    fn test_unregistered_name_is_its_own_type() {
        let kinds = FieldKinds::with_builtins();
        assert_eq!(kinds.resolve_type("textarea"), "textarea");
        kinds.register("note", FieldKind::new("textarea"));
        assert_eq!(kinds.resolve_type("note"), "textarea");
        assert!(kinds.contains("note"));
    }

    #[test]
    fn test_clones_share_registry() {
        let kinds = FieldKinds::new();
        let shared = kinds.clone();
        shared.register("color", FieldKind::new("text"));
        assert!(kinds.contains("color"));
    }
}
