//! A single form field.

use serde_json::Value;

use crate::attributes::{AttrValue, AttributeBag};
use crate::element::Element;
use crate::error::Result;
use crate::naming::{self, BaseNames, NameSegment, OwnName};
use crate::properties::{PropertyStore, SelectOption};

/// Field type whose value is emitted verbatim.
pub const RAW_FIELD_TYPE: &str = "raw";

/// A form field: slug, type, value, HTML attributes, and properties.
///
/// Fields are created by a [`Form`](crate::Form) and configured through the
/// `&mut Field` it hands back:
///
/// ```rust
/// # use std::rc::Rc;
/// # use formwork::{Element, Field, Form, Renderer};
/// # struct Plain;
/// # impl Renderer for Plain {
/// #     fn is_valid_type(&self, _: &str) -> bool { true }
/// #     fn form_open(&self, _: &Form) -> String { String::new() }
/// #     fn form_close(&self, _: &Form) -> String { String::new() }
/// #     fn row_open(&self, _: &Element, _: &[&Field]) -> String { String::new() }
/// #     fn row_close(&self, _: &Element, _: &[&Field]) -> String { String::new() }
/// #     fn field(&self, _: &Form, f: &Field) -> String { f.slug().to_string() }
/// # }
/// let mut form = Form::new(Rc::new(Plain));
/// form.add("email", "email")
///     .unwrap()
///     .label("Email address")
///     .attr("placeholder", "you@example.com")
///     .add_name("user", false);
///
/// assert_eq!(form.get("email").unwrap().name().as_deref(), Some("user[email]"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    slug: String,
    field_type: String,
    value: Value,
    attributes: AttributeBag,
    properties: PropertyStore,
    own_name: OwnName,
    // Form-level prefixes, kept separate from the field's own base names.
    form_names: Vec<String>,
}

impl Field {
    /// Creates a detached field.
    pub fn new(slug: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            field_type: field_type.into(),
            value: Value::Null,
            attributes: AttributeBag::new(),
            properties: PropertyStore::new(),
            own_name: OwnName::Slug,
            form_names: Vec::new(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    /// Returns true for [`RAW_FIELD_TYPE`] fields.
    pub fn is_raw(&self) -> bool {
        self.field_type == RAW_FIELD_TYPE
    }

    /// Changes the type. The form does not re-validate it.
    pub fn set_type(&mut self, field_type: impl Into<String>) -> &mut Self {
        self.field_type = field_type.into();
        self
    }

    /// The field's own value (`Null` when unset).
    pub fn get_value(&self) -> &Value {
        &self.value
    }

    /// The value as display text: strings verbatim, `Null` as empty, other
    /// JSON values in their compact serialization.
    pub fn value_text(&self) -> String {
        value_text(&self.value)
    }

    /// Returns true when the value is `Null` or an empty string.
    pub fn has_empty_value(&self) -> bool {
        is_empty_value(&self.value)
    }

    pub fn value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = value.into();
        self
    }

    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        &mut self.attributes
    }

    /// Sets an HTML attribute.
    pub fn attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attributes.set(key, value);
        self
    }

    /// Adds space-separated CSS classes.
    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        self.attributes.add_class(classes);
        self
    }

    pub fn remove_class(&mut self, classes: &str) -> &mut Self {
        self.attributes.remove_class(classes);
        self
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    /// Sets a property by name (typed keys are validated).
    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.properties.set(name, value)?;
        Ok(self)
    }

    /// Reads a property by name; `Null` when absent.
    pub fn property(&self, name: &str) -> Value {
        self.properties.get(name)
    }

    // -------------------------------------------------------------------------
    // Typed property shortcuts
    // -------------------------------------------------------------------------

    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.properties.set_label(Some(label.into()));
        self
    }

    pub fn clear_label(&mut self) -> &mut Self {
        self.properties.set_label(None);
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.properties.set_description(Some(description.into()));
        self
    }

    pub fn options(&mut self, options: Vec<SelectOption>) -> &mut Self {
        self.properties.set_options(options);
        self
    }

    /// Excludes the field from rendering.
    pub fn skip(&mut self, skip: bool) -> &mut Self {
        self.properties.set_skip(skip);
        self
    }

    /// Marks the field as submitting a list (`name[]`).
    pub fn multiple(&mut self, multiple: bool) -> &mut Self {
        self.properties.set_multiple(multiple);
        self
    }

    /// Wraps the field in `container` instead of the default `div`.
    pub fn container(&mut self, container: Element) -> &mut Self {
        self.properties.set_container(Some(container));
        self
    }

    /// Renders the field without a wrapping container.
    pub fn no_container(&mut self) -> &mut Self {
        self.properties.set_container(None);
        self
    }

    // -------------------------------------------------------------------------
    // Naming
    // -------------------------------------------------------------------------

    /// Sets the name the field composes from, in place of its slug.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.own_name = OwnName::Custom(name.into());
        self
    }

    pub fn own_name(&self) -> &OwnName {
        &self.own_name
    }

    pub fn set_own_name(&mut self, own_name: OwnName) -> &mut Self {
        self.own_name = own_name;
        self
    }

    /// Adds a base-name prefix. `on_top` makes it the outermost segment.
    pub fn add_name(&mut self, segment: impl Into<NameSegment>, on_top: bool) -> &mut Self {
        self.properties.base_names_mut().push(segment.into(), on_top);
        self
    }

    pub fn base_names(&mut self, base_names: BaseNames) -> &mut Self {
        self.properties.set_base_names(base_names);
        self
    }

    /// Form-level prefixes applied in front of the field's own base names.
    pub fn form_names(&self) -> &[String] {
        &self.form_names
    }

    pub(crate) fn set_form_names(&mut self, names: Vec<String>) {
        self.form_names = names;
    }

    /// The composed submission name, or `None` when naming is suppressed
    /// (by [`OwnName::Suppressed`] or [`BaseNames::Suppressed`]).
    pub fn name(&self) -> Option<String> {
        let own_base = self.properties.base_names().segments()?;
        let base: Vec<NameSegment> = self
            .form_names
            .iter()
            .map(|n| NameSegment::name(n.as_str()))
            .chain(own_base.iter().cloned())
            .collect();
        naming::compose(&self.own_name, &self.slug, &base, self.properties.multiple())
    }

    /// The name with brackets removed, for ids and selectors. Falls back to
    /// the slug when the field has no name.
    pub fn safe_name(&self) -> String {
        naming::safe_name(&self.name().unwrap_or_else(|| self.slug.clone()))
    }

    /// The name in dotted key-path form, for model lookup.
    pub fn dot_name(&self) -> String {
        naming::dot_name(&self.name().unwrap_or_else(|| self.slug.clone()))
    }
}

/// Display text for a JSON value.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let field = Field::new("email", "email");
        assert_eq!(field.slug(), "email");
        assert_eq!(field.field_type(), "email");
        assert!(field.has_empty_value());
        assert_eq!(field.name().as_deref(), Some("email"));
        assert!(field.properties().container().is_some());
        assert!(!field.is_raw());
    }

    #[test]
    fn test_fluent_configuration() {
        let mut field = Field::new("tags", "select");
        field
            .label("Tags")
            .multiple(true)
            .add_name("post", false)
            .attr("size", 4_i64)
            .add_class("wide");
        assert_eq!(field.properties().label(), Some("Tags"));
        assert_eq!(field.name().as_deref(), Some("post[tags][]"));
        assert_eq!(field.safe_name(), "post.tags");
        assert_eq!(field.dot_name(), "post.tags");
        assert_eq!(field.attributes().get_str("size"), Some("4"));
    }

    #[test]
    fn test_form_names_come_first() {
        let mut field = Field::new("city", "text");
        field.add_name("address", false);
        field.set_form_names(vec!["user".into()]);
        assert_eq!(field.name().as_deref(), Some("user[address][city]"));

        field.add_name(NameSegment::Anchor, true);
        assert_eq!(field.name().as_deref(), Some("address[city]"));
    }

    #[test]
    fn test_custom_and_suppressed_names() {
        let mut field = Field::new("x", "text");
        field.set_name("profile.nickname");
        assert_eq!(field.name().as_deref(), Some("profile[nickname]"));
        assert_eq!(field.dot_name(), "profile.nickname");

        field.set_own_name(OwnName::Suppressed);
        assert_eq!(field.name(), None);
        assert_eq!(field.safe_name(), "x");

        field.set_own_name(OwnName::Slug).base_names(BaseNames::Suppressed);
        assert_eq!(field.name(), None);
    }

    #[test]
    fn test_value_text() {
        let mut field = Field::new("n", "number");
        assert_eq!(field.value_text(), "");
        field.value(42);
        assert_eq!(field.value_text(), "42");
        field.value("hi");
        assert_eq!(field.value_text(), "hi");
        field.value(json!(""));
        assert!(field.has_empty_value());
    }

    #[test]
    fn test_generic_property_access() {
        let mut field = Field::new("n", "text");
        field.set_property("placeholder_hint", "type here").unwrap();
        field.set_property("skip", true).unwrap();
        assert_eq!(field.property("placeholder_hint"), json!("type here"));
        assert!(field.properties().skip());
        assert!(field.set_property("skip", "nope").is_err());
    }
}
