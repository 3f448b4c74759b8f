#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]

//! Property-based tests for formwork:
//! name composition, ordered table indices, relative inserts, safe names,
//! and row buffering.

use std::collections::HashSet;
use std::rc::Rc;

use formwork::naming::{compose, safe_name, NameSegment, OwnName};
use formwork::{Element, Field, Form, FormError, OrderedTable, Renderer};
use proptest::prelude::*;
use serde_json::json;

struct Accepting;

impl Renderer for Accepting {
    fn is_valid_type(&self, _field_type: &str) -> bool {
        true
    }

    fn form_open(&self, _form: &Form) -> String {
        String::new()
    }

    fn form_close(&self, _form: &Form) -> String {
        String::new()
    }

    fn row_open(&self, _row: &Element, _fields: &[&Field]) -> String {
        String::new()
    }

    fn row_close(&self, _row: &Element, _fields: &[&Field]) -> String {
        String::new()
    }

    fn field(&self, _form: &Form, field: &Field) -> String {
        field.slug().to_string()
    }
}

fn slug() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn unique_slugs(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(slug(), 1..max).prop_map(|set| set.into_iter().collect())
}

fn table_of(keys: &[String]) -> OrderedTable<usize> {
    let mut table = OrderedTable::new();
    for (i, key) in keys.iter().enumerate() {
        table.push(key.as_str(), i).unwrap();
    }
    table
}

// =============================================================================
// Name composition
// =============================================================================

proptest! {
    #[test]
    fn compose_without_base_is_slug(s in slug()) {
        prop_assert_eq!(compose(&OwnName::Slug, &s, &[], false), Some(s.clone()));
    }

    #[test]
    fn compose_nests_every_base(bases in prop::collection::vec(slug(), 1..5), s in slug(), multiple in any::<bool>()) {
        let segments: Vec<NameSegment> = bases.iter().map(|b| NameSegment::name(b.as_str())).collect();
        let mut expected = bases[0].clone();
        for inner in bases.iter().skip(1).chain(std::iter::once(&s)) {
            expected.push_str(&format!("[{inner}]"));
        }
        if multiple {
            expected.push_str("[]");
        }
        prop_assert_eq!(compose(&OwnName::Slug, &s, &segments, multiple), Some(expected));
    }

    #[test]
    fn compose_suppressed_is_none(bases in prop::collection::vec(slug(), 0..4), s in slug(), multiple in any::<bool>()) {
        let segments: Vec<NameSegment> = bases.into_iter().map(NameSegment::from).collect();
        prop_assert_eq!(compose(&OwnName::Suppressed, &s, &segments, multiple), None);
    }

    #[test]
    fn anchor_discards_outer_segments(outer in prop::collection::vec(slug(), 0..4), s in slug()) {
        let mut segments: Vec<NameSegment> = outer.into_iter().map(NameSegment::from).collect();
        segments.push(NameSegment::Anchor);
        prop_assert_eq!(compose(&OwnName::Slug, &s, &segments, false), Some(s.clone()));
    }

    #[test]
    fn safe_name_removes_brackets(bases in prop::collection::vec(slug(), 0..4), s in slug(), multiple in any::<bool>()) {
        let segments: Vec<NameSegment> = bases.into_iter().map(NameSegment::from).collect();
        let name = compose(&OwnName::Slug, &s, &segments, multiple).unwrap();
        let once = safe_name(&name);
        prop_assert!(!once.contains('[') && !once.contains(']'));
    }

    // Nested names turn into dots, which a second pass rewrites to `_`, so
    // idempotence only holds for flat names.
    #[test]
    fn safe_name_is_idempotent_for_flat_names(s in slug(), multiple in any::<bool>()) {
        let name = compose(&OwnName::Slug, &s, &[], multiple).unwrap();
        let once = safe_name(&name);
        prop_assert_eq!(safe_name(&once), once.clone());
    }
}

// =============================================================================
// Ordered table
// =============================================================================

proptest! {
    #[test]
    fn distinct_keys_have_distinct_indices(keys in unique_slugs(12)) {
        let table = table_of(&keys);
        let indices: HashSet<usize> = keys.iter().map(|k| table.index_of(k).unwrap()).collect();
        prop_assert_eq!(indices.len(), keys.len());
        prop_assert!(indices.iter().all(|&i| i < keys.len()));
    }

    #[test]
    fn insert_before_lands_immediately_before(keys in unique_slugs(10), pick in any::<prop::sample::Index>()) {
        let mut table = table_of(&keys);
        let existing = &keys[pick.index(keys.len())];
        table.insert_before(existing, "__new", 0).unwrap();
        prop_assert_eq!(table.index_of("__new").unwrap() + 1, table.index_of(existing).unwrap());
    }

    #[test]
    fn insert_after_lands_immediately_after(keys in unique_slugs(10), pick in any::<prop::sample::Index>()) {
        let mut table = table_of(&keys);
        let existing = &keys[pick.index(keys.len())];
        table.insert_after(existing, "__new", 0).unwrap();
        prop_assert_eq!(table.index_of("__new").unwrap(), table.index_of(existing).unwrap() + 1);
    }

    #[test]
    fn remove_keeps_indices_dense(keys in unique_slugs(10), pick in any::<prop::sample::Index>()) {
        let mut table = table_of(&keys);
        let gone = keys[pick.index(keys.len())].clone();
        table.remove(&gone).unwrap();
        prop_assert!(!table.contains(&gone));
        for (i, key) in table.keys().enumerate() {
            prop_assert_eq!(table.index_of(key), Some(i));
        }
    }

    #[test]
    fn reorder_subset_keeps_every_key(keys in unique_slugs(10), take in 0usize..10) {
        let mut table = table_of(&keys);
        let listed: Vec<String> = keys.iter().rev().take(take).cloned().collect();
        table.reorder(&listed).unwrap();
        prop_assert_eq!(table.len(), keys.len());
        let order: Vec<&str> = table.keys().collect();
        for (i, key) in listed.iter().enumerate() {
            prop_assert_eq!(order[i], key.as_str());
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

proptest! {
    #[test]
    fn missing_slugs_are_not_found(keys in unique_slugs(6), probe in slug()) {
        prop_assume!(!keys.contains(&probe));
        let mut form = Form::new(Rc::new(Accepting));
        for key in &keys {
            form.add(key, "text").unwrap();
        }
        prop_assert_eq!(form.get(&probe).unwrap_err(), FormError::FieldNotFound(probe.clone()));
        prop_assert_eq!(form.remove(&probe).unwrap_err(), FormError::FieldNotFound(probe.clone()));
    }

    #[test]
    fn buffered_properties_reach_only_inner_fields(
        keys in prop::collection::hash_set(slug(), 3..9),
        split in 1usize..3,
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let (outer, inner) = keys.split_at(split);
        let mut form = Form::new(Rc::new(Accepting));
        for key in &outer[..outer.len() / 2] {
            form.add(key, "text").unwrap();
        }
        let inner_keys = inner.to_vec();
        form.run_buffered([("row", json!("r1"))], move |form| {
            for key in &inner_keys {
                form.add(key, "text")?;
            }
            Ok(())
        })
        .unwrap();
        for key in &outer[outer.len() / 2..] {
            form.add(key, "text").unwrap();
        }

        for key in inner {
            prop_assert_eq!(form.get(key).unwrap().properties().row(), Some("r1"));
        }
        for key in outer {
            prop_assert_eq!(form.get(key).unwrap().properties().row(), None);
        }
    }
}
