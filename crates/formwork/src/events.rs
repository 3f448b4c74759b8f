//! Lifecycle event dispatch.
//!
//! An [`EventBus`] holds two kinds of listeners:
//!
//! - **Bindings**: ad-hoc callbacks registered per event name with
//!   [`EventBus::bind`], optionally under an identifier so they can be
//!   replaced or removed later.
//! - **Binders**: objects implementing [`Binder`], dispatched automatically
//!   for the seven [`Lifecycle`] events without per-event registration.
//!
//! Firing a lifecycle event runs every binder's hook (registration order),
//! then every binding for that event (registration order), and concatenates
//! the strings they return. Other event names only reach bindings.
//!
//! # Example
//!
//! ```rust
//! use formwork::{EventArgs, EventBus};
//!
//! let mut bus = EventBus::new();
//! bus.bind("ping", |_args: &mut EventArgs<'_>| Some("pong".to_string()), None);
//! bus.bind("ping", |_args: &mut EventArgs<'_>| Some("!".to_string()), None);
//!
//! let out = bus.fire("ping", &mut EventArgs::Values(&[])).unwrap();
//! assert_eq!(out, "pong!");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, trace};

use crate::element::Element;
use crate::error::{FormError, Result};
use crate::field::Field;
use crate::form::Form;

/// The reserved lifecycle events binders receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// A field was created and is about to be attached.
    NewField,
    /// Before a field's markup.
    BeforeField,
    /// After a field's markup.
    AfterField,
    /// Before a row's markup.
    BeforeRow,
    /// After a row's markup.
    AfterRow,
    /// Before the form's opening tag.
    BeforeForm,
    /// Before the form's closing tag.
    AfterForm,
}

impl Lifecycle {
    /// All lifecycle events.
    pub const ALL: [Lifecycle; 7] = [
        Self::NewField,
        Self::BeforeField,
        Self::AfterField,
        Self::BeforeRow,
        Self::AfterRow,
        Self::BeforeForm,
        Self::AfterForm,
    ];

    /// The event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewField => "newField",
            Self::BeforeField => "beforeField",
            Self::AfterField => "afterField",
            Self::BeforeRow => "beforeRow",
            Self::AfterRow => "afterRow",
            Self::BeforeForm => "beforeForm",
            Self::AfterForm => "afterForm",
        }
    }

    /// Returns true if `args` has the shape this event's hook takes.
    pub fn accepts(&self, args: &EventArgs<'_>) -> bool {
        matches!(
            (self, args),
            (Self::NewField, EventArgs::NewField(_))
                | (Self::BeforeField | Self::AfterField, EventArgs::Field { .. })
                | (Self::BeforeRow | Self::AfterRow, EventArgs::Row { .. })
                | (Self::BeforeForm | Self::AfterForm, EventArgs::Form(_))
        )
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifecycle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Arguments passed to listeners.
pub enum EventArgs<'a> {
    /// `beforeForm` / `afterForm`.
    Form(&'a Form),
    /// `beforeField` / `afterField`.
    Field {
        /// The form being rendered.
        form: &'a Form,
        /// The field about to be (or just) rendered.
        field: &'a Field,
    },
    /// `newField` and `new<Type>Field`; listeners may configure the field.
    NewField(&'a mut Field),
    /// `beforeRow` / `afterRow`.
    Row {
        /// The row wrapper element.
        row: &'a Element,
        /// Fields rendered in the row.
        fields: &'a [&'a Field],
    },
    /// Any other event.
    Values(&'a [Value]),
}

impl EventArgs<'_> {
    /// The field these arguments carry, if any.
    pub fn field(&self) -> Option<&Field> {
        match self {
            Self::Field { field, .. } => Some(field),
            Self::NewField(field) => Some(field),
            _ => None,
        }
    }
}

/// A fixed set of lifecycle hooks, dispatched automatically.
///
/// Every hook has a default that returns nothing, so a binder implements
/// only the hooks it needs. Returned strings are concatenated into the
/// rendered output (the `newField` result is discarded by forms).
pub trait Binder {
    /// A new field was created. Runs before the field is attached.
    fn new_field(&self, _field: &mut Field) -> Option<String> {
        None
    }

    fn before_field(&self, _form: &Form, _field: &Field) -> Option<String> {
        None
    }

    fn after_field(&self, _form: &Form, _field: &Field) -> Option<String> {
        None
    }

    fn before_row(&self, _row: &Element, _fields: &[&Field]) -> Option<String> {
        None
    }

    fn after_row(&self, _row: &Element, _fields: &[&Field]) -> Option<String> {
        None
    }

    fn before_form(&self, _form: &Form) -> Option<String> {
        None
    }

    fn after_form(&self, _form: &Form) -> Option<String> {
        None
    }

    /// Name used when the binder is registered without one.
    fn binder_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A shared event callback.
pub type Callback = Rc<dyn Fn(&mut EventArgs<'_>) -> Option<String>>;

#[derive(Clone)]
struct Binding {
    identifier: Option<String>,
    callback: Callback,
}

/// Listener registry for one form (or one builder's defaults).
#[derive(Clone, Default)]
pub struct EventBus {
    bindings: HashMap<String, Vec<Binding>>,
    binders: Vec<(String, Rc<dyn Binder>)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<_> = self.bindings.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        events.sort_unstable();
        f.debug_struct("EventBus")
            .field("bindings", &events)
            .field("binders", &self.binder_names().collect::<Vec<_>>())
            .finish()
    }
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for `event`.
    ///
    /// With an identifier, a callback previously bound under the same
    /// identifier for this event is replaced in place.
    pub fn bind<F>(&mut self, event: &str, callback: F, identifier: Option<&str>) -> &mut Self
    where
        F: Fn(&mut EventArgs<'_>) -> Option<String> + 'static,
    {
        self.bind_shared(event, Rc::new(callback), identifier)
    }

    /// Registers an already shared callback.
    pub fn bind_shared(&mut self, event: &str, callback: Callback, identifier: Option<&str>) -> &mut Self {
        let list = self.bindings.entry(event.to_string()).or_default();
        let binding = Binding {
            identifier: identifier.map(str::to_string),
            callback,
        };
        match identifier.and_then(|id| list.iter().position(|b| b.identifier.as_deref() == Some(id))) {
            Some(existing) => list[existing] = binding,
            None => list.push(binding),
        }
        trace!(event.name = event, event.identifier = ?identifier, "Callback bound");
        self
    }

    /// Removes the callback bound under `identifier`, or every callback for
    /// `event` when no identifier is given.
    pub fn unbind(&mut self, event: &str, identifier: Option<&str>) -> &mut Self {
        match identifier {
            Some(id) => {
                if let Some(list) = self.bindings.get_mut(event) {
                    list.retain(|b| b.identifier.as_deref() != Some(id));
                }
            }
            None => {
                self.bindings.remove(event);
            }
        }
        self
    }

    /// Number of callbacks bound for `event`.
    pub fn binding_count(&self, event: &str) -> usize {
        self.bindings.get(event).map_or(0, Vec::len)
    }

    /// Registers a binder. Without a name the binder's type name is used;
    /// registering under an existing name replaces that binder in place.
    /// Returns the name used.
    pub fn add_binder<B: Binder + 'static>(&mut self, binder: B, name: Option<&str>) -> String {
        self.add_shared_binder(Rc::new(binder), name)
    }

    /// Registers an already shared binder.
    pub fn add_shared_binder(&mut self, binder: Rc<dyn Binder>, name: Option<&str>) -> String {
        let name = name.unwrap_or_else(|| binder.binder_name()).to_string();
        match self.binders.iter().position(|(n, _)| *n == name) {
            Some(existing) => self.binders[existing].1 = binder,
            None => self.binders.push((name.clone(), binder)),
        }
        debug!(binder.name = %name, binder.count = self.binders.len(), "Binder registered");
        name
    }

    /// Removes a binder by name. Returns true if one was removed.
    pub fn remove_binder(&mut self, name: &str) -> bool {
        let before = self.binders.len();
        self.binders.retain(|(n, _)| n != name);
        before != self.binders.len()
    }

    /// Registered binder names in dispatch order.
    pub fn binder_names(&self) -> impl Iterator<Item = &str> {
        self.binders.iter().map(|(n, _)| n.as_str())
    }

    /// Copies every binder and binding of `other` into this bus.
    pub fn extend_from(&mut self, other: &EventBus) {
        for (name, binder) in &other.binders {
            self.add_shared_binder(Rc::clone(binder), Some(name));
        }
        let mut events: Vec<_> = other.bindings.iter().collect();
        events.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for (event, list) in events {
            for binding in list {
                self.bind_shared(event, Rc::clone(&binding.callback), binding.identifier.as_deref());
            }
        }
    }

    /// Fires `event` and returns the concatenated listener output.
    ///
    /// Firing an event nobody listens to returns an empty string. A lifecycle
    /// event fired with arguments that do not fit its hook fails with
    /// [`FormError::EventArgsMismatch`].
    pub fn fire(&self, event: &str, args: &mut EventArgs<'_>) -> Result<String> {
        let mut output = String::new();

        if let Ok(hook) = event.parse::<Lifecycle>() {
            if !hook.accepts(args) {
                return Err(FormError::EventArgsMismatch {
                    event: event.to_string(),
                });
            }
            for (_, binder) in &self.binders {
                if let Some(out) = dispatch(binder.as_ref(), hook, args) {
                    output.push_str(&out);
                }
            }
        }

        let bindings = self.bindings.get(event).map_or(&[][..], Vec::as_slice);
        for binding in bindings {
            if let Some(out) = (binding.callback)(args) {
                output.push_str(&out);
            }
        }

        trace!(
            event.name = event,
            event.binders = self.binders.len(),
            event.bindings = bindings.len(),
            event.output_len = output.len(),
            "Event fired"
        );
        Ok(output)
    }
}

fn dispatch(binder: &dyn Binder, hook: Lifecycle, args: &mut EventArgs<'_>) -> Option<String> {
    match (hook, args) {
        (Lifecycle::NewField, EventArgs::NewField(field)) => binder.new_field(field),
        (Lifecycle::BeforeField, EventArgs::Field { form, field }) => binder.before_field(form, field),
        (Lifecycle::AfterField, EventArgs::Field { form, field }) => binder.after_field(form, field),
        (Lifecycle::BeforeRow, EventArgs::Row { row, fields }) => binder.before_row(row, fields),
        (Lifecycle::AfterRow, EventArgs::Row { row, fields }) => binder.after_row(row, fields),
        (Lifecycle::BeforeForm, EventArgs::Form(form)) => binder.before_form(form),
        (Lifecycle::AfterForm, EventArgs::Form(form)) => binder.after_form(form),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Tagger(&'static str);

    impl Binder for Tagger {
        fn before_row(&self, _row: &Element, fields: &[&Field]) -> Option<String> {
            Some(format!("{}:{}", self.0, fields.len()))
        }
    }

    fn row_args<'a>(row: &'a Element) -> EventArgs<'a> {
        EventArgs::Row { row, fields: &[] }
    }

    #[test]
    fn test_fire_without_listeners_is_empty() {
        let bus = EventBus::new();
        assert_eq!(bus.fire("anything", &mut EventArgs::Values(&[])).unwrap(), "");
        let row = Element::row("r", "field-row");
        assert_eq!(bus.fire("beforeRow", &mut row_args(&row)).unwrap(), "");
    }

    #[test]
    fn test_bindings_fire_in_registration_order() {
        let mut bus = EventBus::new();
        bus.bind("x", |_: &mut EventArgs<'_>| Some("1".into()), None);
        bus.bind("x", |_: &mut EventArgs<'_>| None, None);
        bus.bind("x", |_: &mut EventArgs<'_>| Some("2".into()), None);
        assert_eq!(bus.fire("x", &mut EventArgs::Values(&[])).unwrap(), "12");
        assert_eq!(bus.binding_count("x"), 3);
    }

    #[test]
    fn test_identifier_replaces_in_place() {
        let mut bus = EventBus::new();
        bus.bind("x", |_: &mut EventArgs<'_>| Some("a".into()), Some("first"));
        bus.bind("x", |_: &mut EventArgs<'_>| Some("b".into()), None);
        bus.bind("x", |_: &mut EventArgs<'_>| Some("A".into()), Some("first"));
        assert_eq!(bus.fire("x", &mut EventArgs::Values(&[])).unwrap(), "Ab");

        bus.unbind("x", Some("first"));
        assert_eq!(bus.fire("x", &mut EventArgs::Values(&[])).unwrap(), "b");

        bus.unbind("x", None);
        assert_eq!(bus.binding_count("x"), 0);
    }

    #[test]
    fn test_binders_run_before_bindings() {
        let mut bus = EventBus::new();
        bus.bind("beforeRow", |_: &mut EventArgs<'_>| Some("[cb]".into()), None);
        bus.add_binder(Tagger("one"), Some("one"));
        bus.add_binder(Tagger("two"), Some("two"));

        let row = Element::row("r", "field-row");
        let out = bus.fire("beforeRow", &mut row_args(&row)).unwrap();
        assert_eq!(out, "one:0two:0[cb]");
    }

    #[test]
    fn test_binders_ignore_custom_events() {
        let mut bus = EventBus::new();
        bus.add_binder(Tagger("t"), None);
        assert_eq!(bus.fire("beforeRowX", &mut EventArgs::Values(&[])).unwrap(), "");
    }

    #[test]
    fn test_lifecycle_args_mismatch_fails_fast() {
        let bus = EventBus::new();
        let err = bus.fire("beforeField", &mut EventArgs::Values(&[])).unwrap_err();
        assert_eq!(
            err,
            FormError::EventArgsMismatch {
                event: "beforeField".into()
            }
        );
    }

    #[test]
    fn test_binder_naming_and_removal() {
        let mut bus = EventBus::new();
        let name = bus.add_binder(Tagger("t"), None);
        assert!(name.ends_with("Tagger"));
        bus.add_binder(Tagger("u"), Some(&name));
        assert_eq!(bus.binder_names().count(), 1);
        assert!(bus.remove_binder(&name));
        assert!(!bus.remove_binder(&name));
    }

    #[test]
    fn test_extend_from_copies_listeners() {
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        let mut defaults = EventBus::new();
        defaults.bind(
            "x",
            move |_: &mut EventArgs<'_>| {
                *counter.borrow_mut() += 1;
                None
            },
            Some("count"),
        );
        defaults.add_binder(Tagger("d"), Some("d"));

        let mut bus = EventBus::new();
        bus.extend_from(&defaults);
        bus.fire("x", &mut EventArgs::Values(&[])).unwrap();
        assert_eq!(*seen.borrow(), 1);
        assert_eq!(bus.binder_names().collect::<Vec<_>>(), ["d"]);
    }

    #[test]
    fn test_lifecycle_parsing() {
        for event in Lifecycle::ALL {
            assert_eq!(event.as_str().parse::<Lifecycle>(), Ok(event));
        }
        assert!("newTextField".parse::<Lifecycle>().is_err());
    }
}
