//! Unit tests for formwork error types.
//!
//! Tests verify:
//! - Error variant creation
//! - Display formatting
//! - Clone and `PartialEq` derives
//! - Helper methods
//! - Conversions from table errors

use formwork::{FormError, Result, TableError};
use std::error::Error as StdError;

mod creation_tests {
    use super::*;

    #[test]
    fn test_all_variants_creatable() {
        let errors = [
            FormError::DuplicateField("a".into()),
            FormError::FieldNotFound("a".into()),
            FormError::UnknownFieldType("a".into()),
            FormError::RendererNotFound("a".into()),
            FormError::MacroNotFound("a".into()),
            FormError::invalid_property("skip", "expected a boolean"),
            FormError::EventArgsMismatch {
                event: "beforeRow".into(),
            },
            FormError::InvalidModel("a".into()),
            FormError::DuplicatePosition("a".into()),
        ];

        assert_eq!(errors.len(), 9);
    }

    #[test]
    fn test_invalid_property_helper() {
        let e = FormError::invalid_property("rowSize", "expected a non-negative integer");
        assert!(matches!(
            e,
            FormError::InvalidProperty { ref name, .. } if name == "rowSize"
        ));
    }
}

mod display_tests {
    use super::*;

    #[test]
    fn test_duplicate_field_display() {
        let e = FormError::DuplicateField("email".into());
        assert_eq!(
            format!("{e}"),
            "field with slug 'email' has already been added to this form"
        );
    }

    #[test]
    fn test_field_not_found_display() {
        let e = FormError::FieldNotFound("email".into());
        assert_eq!(format!("{e}"), "field with slug 'email' doesn't exist");
    }

    #[test]
    fn test_lookup_failures_display() {
        assert_eq!(
            FormError::UnknownFieldType("color".into()).to_string(),
            "unknown field type 'color'"
        );
        assert_eq!(
            FormError::RendererNotFound("html".into()).to_string(),
            "renderer 'html' is not registered"
        );
        assert_eq!(
            FormError::MacroNotFound("stars".into()).to_string(),
            "macro 'stars' is not registered"
        );
    }

    #[test]
    fn test_event_mismatch_display() {
        let e = FormError::EventArgsMismatch {
            event: "afterForm".into(),
        };
        assert!(e.to_string().contains("afterForm"));
    }
}

mod derives_tests {
    use super::*;

    #[test]
    fn test_clone_and_eq() {
        let e = FormError::FieldNotFound("x".into());
        assert_eq!(e.clone(), e);
        assert_ne!(e, FormError::FieldNotFound("y".into()));
    }

    #[test]
    fn test_is_std_error() {
        let e = FormError::MacroNotFound("x".into());
        let dyn_err: &dyn StdError = &e;
        assert!(dyn_err.source().is_none());
    }

    #[test]
    fn test_debug_contains_variant() {
        let e = FormError::RendererNotFound("html".into());
        assert!(format!("{e:?}").contains("RendererNotFound"));
    }
}

mod helper_tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(FormError::FieldNotFound("a".into()).is_not_found());
        assert!(FormError::RendererNotFound("a".into()).is_not_found());
        assert!(FormError::MacroNotFound("a".into()).is_not_found());
        assert!(!FormError::UnknownFieldType("a".into()).is_not_found());
    }

    #[test]
    fn test_is_duplicate() {
        assert!(FormError::DuplicateField("a".into()).is_duplicate());
        assert!(!FormError::DuplicatePosition("a".into()).is_duplicate());
    }

    #[test]
    fn test_from_table_error() {
        assert_eq!(
            FormError::from(TableError::DuplicateKey("a".into())),
            FormError::DuplicateField("a".into())
        );
        assert_eq!(
            FormError::from(TableError::KeyNotFound("a".into())),
            FormError::FieldNotFound("a".into())
        );
        assert_eq!(
            FormError::from(TableError::DuplicatePosition("a".into())),
            FormError::DuplicatePosition("a".into())
        );
    }

    #[test]
    fn test_result_alias() {
        fn lookup(found: bool) -> Result<u8> {
            if found {
                Ok(1)
            } else {
                Err(FormError::FieldNotFound("x".into()))
            }
        }
        assert_eq!(lookup(true), Ok(1));
        assert!(lookup(false).is_err());
    }
}
