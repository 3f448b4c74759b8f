//! Typed "soft" field properties.
//!
//! Properties are settings that drive rendering but are not HTML
//! attributes: the label, select options, the row a field belongs to, and so
//! on. The recognized ones are typed fields on [`PropertyStore`]; anything
//! else lands in a free-form map. Both are reachable through the generic
//! [`PropertyStore::set`] / [`PropertyStore::get`] pair, keyed by name.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::element::Element;
use crate::error::{FormError, Result};
use crate::naming::{BaseNames, NameSegment};

/// One entry of a select-style field's options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Text shown to the user.
    pub label: String,
}

impl SelectOption {
    /// Creates a new option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Creates options whose value and label are the same string.
pub fn options_from_values<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> Vec<SelectOption> {
    values
        .into_iter()
        .map(|v| SelectOption::new(v.as_ref(), v.as_ref()))
        .collect()
}

/// The recognized property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Label,
    Description,
    Options,
    Row,
    RowSize,
    Skip,
    BaseNames,
    Container,
    Multiple,
}

impl PropertyKey {
    /// All recognized keys.
    pub const ALL: [PropertyKey; 9] = [
        Self::Label,
        Self::Description,
        Self::Options,
        Self::Row,
        Self::RowSize,
        Self::Skip,
        Self::BaseNames,
        Self::Container,
        Self::Multiple,
    ];

    /// The property name as used by the generic accessors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Description => "description",
            Self::Options => "options",
            Self::Row => "row",
            Self::RowSize => "rowSize",
            Self::Skip => "skip",
            Self::BaseNames => "baseNames",
            Self::Container => "container",
            Self::Multiple => "multiple",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Per-field property storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyStore {
    label: Option<String>,
    description: Option<String>,
    options: Vec<SelectOption>,
    row: Option<String>,
    row_size: usize,
    skip: bool,
    base_names: BaseNames,
    container: Option<Element>,
    multiple: bool,
    extra: BTreeMap<String, Value>,
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self {
            label: None,
            description: None,
            options: Vec::new(),
            row: None,
            row_size: 0,
            skip: false,
            base_names: BaseNames::default(),
            container: Some(Element::container()),
            multiple: false,
            extra: BTreeMap::new(),
        }
    }
}

impl PropertyStore {
    /// Creates a store with default values (a `div` container, no label).
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
    }

    /// The id of the row this field is rendered in.
    pub fn row(&self) -> Option<&str> {
        self.row.as_deref()
    }

    pub fn set_row(&mut self, row: Option<String>) {
        self.row = row;
    }

    /// Number of fields in this field's row, set by the form at render time.
    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn set_row_size(&mut self, size: usize) {
        self.row_size = size;
    }

    /// Skipped fields are left out when the form renders all fields.
    pub fn skip(&self) -> bool {
        self.skip
    }

    pub fn set_skip(&mut self, skip: bool) {
        self.skip = skip;
    }

    pub fn base_names(&self) -> &BaseNames {
        &self.base_names
    }

    pub fn base_names_mut(&mut self) -> &mut BaseNames {
        &mut self.base_names
    }

    pub fn set_base_names(&mut self, base_names: BaseNames) {
        self.base_names = base_names;
    }

    /// The wrapping element, or `None` to render the field unwrapped.
    pub fn container(&self) -> Option<&Element> {
        self.container.as_ref()
    }

    pub fn container_mut(&mut self) -> Option<&mut Element> {
        self.container.as_mut()
    }

    pub fn set_container(&mut self, container: Option<Element>) {
        self.container = container;
    }

    /// Multiple fields submit an array (`name[]`).
    pub fn multiple(&self) -> bool {
        self.multiple
    }

    pub fn set_multiple(&mut self, multiple: bool) {
        self.multiple = multiple;
    }

    /// Properties outside the recognized set.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    // -------------------------------------------------------------------------
    // Generic accessors
    // -------------------------------------------------------------------------

    /// Sets a property by name.
    ///
    /// Recognized names are converted into their typed representation and
    /// fail with [`FormError::InvalidProperty`] on a value of the wrong shape.
    /// `null` resets a recognized property to its default.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let Ok(key) = name.parse::<PropertyKey>() else {
            self.extra.insert(name.to_string(), value);
            return Ok(());
        };

        match key {
            PropertyKey::Label => self.label = optional_string(name, value)?,
            PropertyKey::Description => self.description = optional_string(name, value)?,
            PropertyKey::Options => self.options = options_from_value(name, value)?,
            PropertyKey::Row => self.row = optional_string(name, value)?,
            PropertyKey::RowSize => {
                self.row_size = match value {
                    Value::Null => 0,
                    Value::Number(n) => n
                        .as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| FormError::invalid_property(name, "expected a non-negative integer"))?,
                    _ => return Err(FormError::invalid_property(name, "expected a non-negative integer")),
                }
            }
            PropertyKey::Skip => self.skip = boolean(name, value)?,
            PropertyKey::Multiple => self.multiple = boolean(name, value)?,
            PropertyKey::BaseNames => self.base_names = base_names_from_value(name, value)?,
            PropertyKey::Container => {
                self.container = match value {
                    Value::Null | Value::Bool(true) => Some(Element::container()),
                    Value::Bool(false) => None,
                    Value::String(tag) => Some(Element::new(tag)),
                    _ => return Err(FormError::invalid_property(name, "expected a boolean or a tag name")),
                }
            }
        }
        Ok(())
    }

    /// Returns a property by name, `Value::Null` when unset.
    pub fn get(&self, name: &str) -> Value {
        self.lookup(name).unwrap_or(Value::Null)
    }

    /// Returns a property by name, or `default` when it is unset.
    pub fn get_or(&self, name: &str, default: impl Into<Value>) -> Value {
        self.lookup(name).unwrap_or_else(|| default.into())
    }

    /// Returns a property by name, computing the fallback only when unset.
    pub fn get_or_else(&self, name: &str, default: impl FnOnce() -> Value) -> Value {
        self.lookup(name).unwrap_or_else(default)
    }

    /// Returns true if the property holds a value.
    pub fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Applies a batch of properties in order.
    pub fn merge<'a>(&mut self, properties: impl IntoIterator<Item = (&'a String, &'a Value)>) -> Result<()> {
        for (name, value) in properties {
            self.set(name, value.clone())?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        let Ok(key) = name.parse::<PropertyKey>() else {
            return self.extra.get(name).cloned();
        };
        match key {
            PropertyKey::Label => self.label.clone().map(Value::String),
            PropertyKey::Description => self.description.clone().map(Value::String),
            PropertyKey::Row => self.row.clone().map(Value::String),
            PropertyKey::Options => Some(Value::Array(
                self.options
                    .iter()
                    .map(|o| {
                        let mut entry = Map::new();
                        entry.insert("value".into(), Value::String(o.value.clone()));
                        entry.insert("label".into(), Value::String(o.label.clone()));
                        Value::Object(entry)
                    })
                    .collect(),
            )),
            PropertyKey::RowSize => Some(Value::from(self.row_size)),
            PropertyKey::Skip => Some(Value::Bool(self.skip)),
            PropertyKey::Multiple => Some(Value::Bool(self.multiple)),
            PropertyKey::BaseNames => Some(match &self.base_names {
                BaseNames::Suppressed => Value::Bool(false),
                BaseNames::List(segments) => Value::Array(
                    segments
                        .iter()
                        .map(|s| match s {
                            NameSegment::Name(n) => Value::String(n.clone()),
                            NameSegment::Anchor => Value::Bool(false),
                        })
                        .collect(),
                ),
            }),
            PropertyKey::Container => Some(match &self.container {
                Some(element) => Value::String(element.tag().to_string()),
                None => Value::Bool(false),
            }),
        }
    }
}

fn optional_string(name: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(FormError::invalid_property(name, "expected a string")),
    }
}

fn boolean(name: &str, value: Value) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        _ => Err(FormError::invalid_property(name, "expected a boolean")),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts `["a", "b"]`, `[["value", "label"], ...]`,
/// `[{"value": .., "label": ..}, ...]`, or an object of value → label.
fn options_from_value(name: &str, value: Value) -> Result<Vec<SelectOption>> {
    let invalid = || FormError::invalid_property(name, "expected a list of options or a value/label map");
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => map
            .into_iter()
            .map(|(value, label)| {
                scalar_text(&label)
                    .map(|label| SelectOption::new(value, label))
                    .ok_or_else(invalid)
            })
            .collect(),
        Value::Array(entries) => entries
            .iter()
            .map(|entry| match entry {
                Value::Array(pair) if pair.len() == 2 => {
                    match (scalar_text(&pair[0]), scalar_text(&pair[1])) {
                        (Some(v), Some(l)) => Ok(SelectOption::new(v, l)),
                        _ => Err(invalid()),
                    }
                }
                Value::Object(obj) => {
                    let value = obj.get("value").and_then(scalar_text).ok_or_else(invalid)?;
                    let label = obj
                        .get("label")
                        .and_then(scalar_text)
                        .unwrap_or_else(|| value.clone());
                    Ok(SelectOption::new(value, label))
                }
                other => scalar_text(other)
                    .map(|v| SelectOption::new(v.clone(), v))
                    .ok_or_else(invalid),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// Accepts `false` (suppressed) or a list of strings and `false` anchors.
fn base_names_from_value(name: &str, value: Value) -> Result<BaseNames> {
    let invalid = || FormError::invalid_property(name, "expected false or a list of names");
    match value {
        Value::Null => Ok(BaseNames::default()),
        Value::Bool(false) => Ok(BaseNames::Suppressed),
        Value::String(s) => Ok(BaseNames::List(vec![NameSegment::Name(s)])),
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                Value::String(s) => Ok(NameSegment::Name(s)),
                Value::Bool(false) => Ok(NameSegment::Anchor),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>>>()
            .map(BaseNames::List),
        _ => Err(invalid()),
    }
}
