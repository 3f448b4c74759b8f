//! HTML attribute storage with class-set handling.
//!
//! [`AttributeBag`] keeps arbitrary key/value attributes plus the `class`
//! attribute as an ordered set. Classes are exported as a single
//! space-joined string.
//!
//! # Example
//!
//! ```rust
//! use formwork::AttributeBag;
//!
//! let mut attrs = AttributeBag::new();
//! attrs.set("placeholder", "you@example.com");
//! attrs.add_class("input wide");
//! attrs.add_class("input");
//!
//! assert_eq!(attrs.class_string(), "input wide");
//! assert_eq!(attrs.get_str("placeholder"), Some("you@example.com"));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the attribute that is stored as a class set.
pub const CLASS_ATTR: &str = "class";

/// A single attribute value.
///
/// `Flag` models boolean HTML attributes such as `required` or `disabled`:
/// `Flag(true)` renders as a bare attribute, `Flag(false)` is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A boolean attribute.
    Flag(bool),
    /// A textual attribute value.
    Text(String),
}

impl AttrValue {
    /// Returns the text value, if this is a text attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }

    /// Returns true unless this is `Flag(false)`.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Flag(false))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        Self::Text(value.to_string())
    }
}

/// Arbitrary HTML attributes plus a set of CSS classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag {
    attrs: BTreeMap<String, AttrValue>,
    classes: Vec<String>,
}

impl AttributeBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute. Setting `class` replaces the class set.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if key == CLASS_ATTR {
            self.classes.clear();
            if let AttrValue::Text(classes) = value {
                self.add_class(&classes);
            }
        } else {
            self.attrs.insert(key, value);
        }
        self
    }

    /// Returns an attribute value. `class` is not stored here; use
    /// [`class_string`](Self::class_string).
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Returns a text attribute value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_str)
    }

    /// Returns true if the attribute is set (or, for `class`, non-empty).
    pub fn contains(&self, key: &str) -> bool {
        if key == CLASS_ATTR {
            return !self.classes.is_empty();
        }
        self.attrs.contains_key(key)
    }

    /// Removes an attribute and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        if key == CLASS_ATTR {
            let joined = self.class_string();
            self.classes.clear();
            return (!joined.is_empty()).then_some(AttrValue::Text(joined));
        }
        self.attrs.remove(key)
    }

    /// Adds one or more space-separated classes. Duplicates are ignored.
    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        for class in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    /// Removes one or more space-separated classes.
    pub fn remove_class(&mut self, classes: &str) -> &mut Self {
        for class in classes.split_whitespace() {
            self.classes.retain(|c| c != class);
        }
        self
    }

    /// Returns true if the class is present.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Classes in insertion order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Classes joined by a single space.
    pub fn class_string(&self) -> String {
        self.classes.join(" ")
    }

    /// Merges another bag into this one. Keys from `other` win; classes are
    /// unioned.
    pub fn merge(&mut self, other: &AttributeBag) -> &mut Self {
        for (key, value) in &other.attrs {
            self.attrs.insert(key.clone(), value.clone());
        }
        for class in &other.classes {
            self.add_class(class);
        }
        self
    }

    /// Number of attributes, counting a non-empty class set as one.
    pub fn len(&self) -> usize {
        self.attrs.len() + usize::from(!self.classes.is_empty())
    }

    /// Returns true if there are no attributes and no classes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.classes.is_empty()
    }

    /// Flattened view: every attribute in key order, with `class` exported as
    /// a space-joined string when non-empty.
    pub fn export(&self) -> BTreeMap<String, AttrValue> {
        let mut out = self.attrs.clone();
        if !self.classes.is_empty() {
            out.insert(CLASS_ATTR.to_string(), AttrValue::Text(self.class_string()));
        }
        out
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeBag
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (key, value) in iter {
            bag.set(key, value);
        }
        bag
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for AttributeBag
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
