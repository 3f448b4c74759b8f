//! Generic wrapper elements (row wrappers and field containers).

use crate::attributes::{AttrValue, AttributeBag};

/// Default tag for field containers.
pub const CONTAINER_TAG: &str = "div";

/// A plain element used as rendering context: a row wrapper or a field's
/// container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: AttributeBag,
}

impl Default for Element {
    fn default() -> Self {
        Self::container()
    }
}

impl Element {
    /// Creates an element with the given tag and no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: AttributeBag::new(),
        }
    }

    /// A `div` container.
    pub fn container() -> Self {
        Self::new(CONTAINER_TAG)
    }

    /// A row wrapper with an `id` attribute and one CSS class.
    pub fn row(id: impl Into<String>, class: &str) -> Self {
        let mut row = Self::container();
        row.attributes.set("id", id.into());
        row.attributes.add_class(class);
        row
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = tag.into();
        self
    }

    /// The `id` attribute, if set.
    pub fn id(&self) -> Option<&str> {
        self.attributes.get_str("id")
    }

    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        &mut self.attributes
    }

    /// Sets an attribute.
    pub fn attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        self.attributes.set(key, value);
        self
    }

    /// Adds space-separated classes.
    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        self.attributes.add_class(classes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_element() {
        let row = Element::row("row-1", "field-row");
        assert_eq!(row.tag(), "div");
        assert_eq!(row.id(), Some("row-1"));
        assert!(row.attributes().has_class("field-row"));
    }

    #[test]
    fn test_builder_methods() {
        let mut el = Element::new("section");
        el.attr("data-x", "1").add_class("a b").set_tag("fieldset");
        assert_eq!(el.tag(), "fieldset");
        assert_eq!(el.attributes().get_str("data-x"), Some("1"));
        assert_eq!(el.attributes().class_string(), "a b");
    }
}
