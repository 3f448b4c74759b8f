//! Bound model data used to pre-fill field values.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{FormError, Result};

/// A bound data object, looked up by dotted key path (`user.address.city`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    root: Value,
}

impl Model {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Serializes any serde value into a model.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::new)
            .map_err(|e| FormError::InvalidModel(e.to_string()))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Value at a dotted key path. Array elements are addressed by index
    /// (`tags.0`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }
        let pointer: String = path
            .split('.')
            .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
            .collect();
        self.root.pointer(&pointer)
    }

    /// Flattens the model into leaf values keyed by dotted path.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut out = BTreeMap::new();
        flatten_into(&self.root, String::new(), &mut out);
        out
    }
}

fn flatten_into(value: &Value, prefix: String, out: &mut BTreeMap<String, Value>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(child, join(key), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                flatten_into(child, join(&i.to_string()), out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.insert(prefix, value.clone());
            }
        }
    }
}
