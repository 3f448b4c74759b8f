//! Insertion-ordered, uniquely keyed storage with positional inserts.
//!
//! [`OrderedTable`] backs a form's field list. Entries are kept in render
//! order; every key maps to exactly one position and every position holds
//! exactly one key.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Errors raised by [`OrderedTable`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The key is already present and overwriting is disabled.
    #[error("key '{0}' already exists")]
    DuplicateKey(String),
    /// The key is not present.
    #[error("key '{0}' not found")]
    KeyNotFound(String),
    /// A reorder list named the same key twice.
    #[error("key '{0}' appears more than once in the position list")]
    DuplicatePosition(String),
}

/// Ordered map from string keys to values.
#[derive(Debug, Clone)]
pub struct OrderedTable<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
    overwrite: bool,
}

impl<V> Default for OrderedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedTable<V> {
    /// Creates an empty table that rejects duplicate keys.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            overwrite: false,
        }
    }

    /// When enabled, inserting an existing key replaces its value in place.
    pub fn set_overwrite(&mut self, overwrite: bool) {
        self.overwrite = overwrite;
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Position of `key`, if present.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index_of(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.index_of(key).map(|i| &mut self.entries[i].1)
    }

    /// Inserts at `position` (clamped to the end), shifting later entries
    /// right. Returns the index the value ended up at.
    ///
    /// With overwrite enabled an existing key keeps its position and only
    /// its value is replaced.
    pub fn insert_at(&mut self, position: usize, key: impl Into<String>, value: V) -> Result<usize, TableError> {
        let key = key.into();
        if let Some(existing) = self.index_of(&key) {
            if !self.overwrite {
                return Err(TableError::DuplicateKey(key));
            }
            self.entries[existing].1 = value;
            return Ok(existing);
        }

        let position = position.min(self.entries.len());
        self.entries.insert(position, (key, value));
        self.reindex_from(position);
        Ok(position)
    }

    /// Appends at the end.
    pub fn push(&mut self, key: impl Into<String>, value: V) -> Result<usize, TableError> {
        self.insert_at(self.entries.len(), key, value)
    }

    /// Inserts immediately before `existing`.
    pub fn insert_before(&mut self, existing: &str, key: impl Into<String>, value: V) -> Result<usize, TableError> {
        let position = self
            .index_of(existing)
            .ok_or_else(|| TableError::KeyNotFound(existing.to_string()))?;
        self.insert_at(position, key, value)
    }

    /// Inserts immediately after `existing`.
    pub fn insert_after(&mut self, existing: &str, key: impl Into<String>, value: V) -> Result<usize, TableError> {
        let position = self
            .index_of(existing)
            .ok_or_else(|| TableError::KeyNotFound(existing.to_string()))?;
        self.insert_at(position + 1, key, value)
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Result<V, TableError> {
        let position = self
            .index
            .remove(key)
            .ok_or_else(|| TableError::KeyNotFound(key.to_string()))?;
        let (_, value) = self.entries.remove(position);
        self.reindex_from(position);
        Ok(value)
    }

    /// Reorders entries by an explicit position list.
    ///
    /// Listed keys come first in the given order; keys that are not listed
    /// follow in their previous relative order. Every listed key must exist
    /// and appear once.
    pub fn reorder<S: AsRef<str>>(&mut self, positions: &[S]) -> Result<(), TableError> {
        let mut seen = HashSet::with_capacity(positions.len());
        for key in positions {
            let key = key.as_ref();
            let idx = self
                .index_of(key)
                .ok_or_else(|| TableError::KeyNotFound(key.to_string()))?;
            if !seen.insert(idx) {
                return Err(TableError::DuplicatePosition(key.to_string()));
            }
        }

        let mut slots: Vec<Option<(String, V)>> = self.entries.drain(..).map(Some).collect();
        let mut reordered = Vec::with_capacity(slots.len());
        for key in positions {
            if let Some(entry) = self.index.get(key.as_ref()).and_then(|&i| slots[i].take()) {
                reordered.push(entry);
            }
        }
        reordered.extend(slots.into_iter().flatten());

        self.entries = reordered;
        self.reindex_from(0);
        Ok(())
    }

    /// Keys in position order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in position order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Mutable values in position order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Entries in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, (key, _)) in self.entries.iter().enumerate().skip(start) {
            self.index.insert(key.clone(), i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(keys: &[&str]) -> OrderedTable<u32> {
        let mut t = OrderedTable::new();
        for (i, k) in keys.iter().enumerate() {
            t.push(*k, i as u32).unwrap();
        }
        t
    }

    fn keys(t: &OrderedTable<u32>) -> Vec<&str> {
        t.keys().collect()
    }

    #[test]
    fn test_push_and_lookup() {
        let t = table(&["a", "b", "c"]);
        assert_eq!(keys(&t), ["a", "b", "c"]);
        assert_eq!(t.index_of("b"), Some(1));
        assert_eq!(t.get("c"), Some(&2));
        assert_eq!(t.index_of("z"), None);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut t = table(&["a"]);
        assert_eq!(t.push("a", 9), Err(TableError::DuplicateKey("a".into())));
        assert_eq!(t.get("a"), Some(&0));
    }

    #[test]
    fn test_overwrite_preserves_position() {
        let mut t = table(&["a", "b", "c"]);
        t.set_overwrite(true);
        assert_eq!(t.push("b", 42), Ok(1));
        assert_eq!(keys(&t), ["a", "b", "c"]);
        assert_eq!(t.get("b"), Some(&42));
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut t = table(&["a", "b"]);
        t.insert_before("a", "x", 10).unwrap();
        assert_eq!(keys(&t), ["x", "a", "b"]);
        assert_eq!(t.index_of("x").unwrap() + 1, t.index_of("a").unwrap());

        t.insert_after("b", "y", 11).unwrap();
        assert_eq!(keys(&t), ["x", "a", "b", "y"]);
        assert_eq!(t.index_of("y").unwrap(), t.index_of("b").unwrap() + 1);

        t.insert_after("x", "z", 12).unwrap();
        assert_eq!(keys(&t), ["x", "z", "a", "b", "y"]);
        assert_eq!(t.index_of("b"), Some(3));
    }

    #[test]
    fn test_insert_relative_to_missing_key() {
        let mut t = table(&["a"]);
        assert_eq!(t.insert_before("nope", "x", 1), Err(TableError::KeyNotFound("nope".into())));
        assert_eq!(t.insert_after("nope", "x", 1), Err(TableError::KeyNotFound("nope".into())));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_insert_at_clamps() {
        let mut t = table(&["a"]);
        assert_eq!(t.insert_at(99, "b", 1), Ok(1));
        assert_eq!(keys(&t), ["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut t = table(&["a", "b", "c"]);
        assert_eq!(t.remove("b"), Ok(1));
        assert_eq!(keys(&t), ["a", "c"]);
        assert_eq!(t.index_of("c"), Some(1));
        assert!(!t.contains("b"));
        assert_eq!(t.remove("b"), Err(TableError::KeyNotFound("b".into())));
    }

    #[test]
    fn test_reorder_full_permutation() {
        let mut t = table(&["a", "b", "c"]);
        t.reorder(&["c", "a", "b"]).unwrap();
        assert_eq!(keys(&t), ["c", "a", "b"]);
        assert_eq!(t.index_of("a"), Some(1));
    }

    #[test]
    fn test_reorder_subset_appends_rest_in_prior_order() {
        let mut t = table(&["a", "b", "c", "d"]);
        t.reorder(&["d", "b"]).unwrap();
        assert_eq!(keys(&t), ["d", "b", "a", "c"]);
    }

    #[test]
    fn test_reorder_rejects_bad_lists() {
        let mut t = table(&["a", "b"]);
        assert_eq!(t.reorder(&["a", "x"]), Err(TableError::KeyNotFound("x".into())));
        assert_eq!(t.reorder(&["a", "a"]), Err(TableError::DuplicatePosition("a".into())));
        assert_eq!(keys(&t), ["a", "b"]);
    }

    #[test]
    fn test_values_mut_in_position_order() {
        let mut t = table(&["a", "b"]);
        t.insert_before("a", "z", 100).unwrap();
        for v in t.values_mut() {
            *v += 1;
        }
        assert_eq!(t.values().copied().collect::<Vec<_>>(), [101, 1, 2]);
    }
}
