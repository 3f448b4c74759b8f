//! Error types for form construction and rendering.

use thiserror::Error;

use crate::table::TableError;

/// Errors raised by the form API.
///
/// Every variant is raised synchronously by the call that detects the
/// misuse. Nothing in this crate catches and recovers from these; they
/// propagate to the application code that made the call.
///
/// | Variant | Raised by |
/// |---------|-----------|
/// | [`DuplicateField`](FormError::DuplicateField) | `add`, `add_before`, `add_after` with a taken slug |
/// | [`FieldNotFound`](FormError::FieldNotFound) | `get`, `find`, `remove`, or an absent anchor slug |
/// | [`UnknownFieldType`](FormError::UnknownFieldType) | attaching a field whose type nothing can render |
/// | [`RendererNotFound`](FormError::RendererNotFound) | asking the builder for an unregistered renderer |
/// | [`MacroNotFound`](FormError::MacroNotFound) | calling a macro that was never registered |
///
/// # Note on Clone and PartialEq
///
/// Like the rest of the error types in this workspace, `FormError` keeps
/// only `String` payloads so it can derive `Clone` and `PartialEq` for
/// testing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A field with this slug is already attached and overwriting is off.
    #[error("field with slug '{0}' has already been added to this form")]
    DuplicateField(String),

    /// No field with this slug is attached.
    #[error("field with slug '{0}' doesn't exist")]
    FieldNotFound(String),

    /// The type is not `raw`, not a registered macro, and not accepted by
    /// the active renderer.
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    /// No renderer is registered under this name.
    #[error("renderer '{0}' is not registered")]
    RendererNotFound(String),

    /// No macro is registered under this name.
    #[error("macro '{0}' is not registered")]
    MacroNotFound(String),

    /// A typed property was given a value of the wrong shape.
    #[error("invalid value for property '{name}': {reason}")]
    InvalidProperty {
        /// Property name as passed to the generic setter.
        name: String,
        /// What was expected.
        reason: String,
    },

    /// A lifecycle event was fired with arguments that do not match its hook.
    #[error("event '{event}' fired with arguments that do not match its binder hook")]
    EventArgsMismatch {
        /// The lifecycle event name.
        event: String,
    },

    /// A bound model could not be turned into a key/value tree.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// A reorder list named the same slug twice.
    #[error("field '{0}' appears more than once in the position list")]
    DuplicatePosition(String),
}

impl From<TableError> for FormError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::DuplicateKey(slug) => Self::DuplicateField(slug),
            TableError::KeyNotFound(slug) => Self::FieldNotFound(slug),
            TableError::DuplicatePosition(slug) => Self::DuplicatePosition(slug),
        }
    }
}

impl FormError {
    /// Creates an invalid property error.
    pub fn invalid_property(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the lookup failures (`FieldNotFound`,
    /// `RendererNotFound`, `MacroNotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FieldNotFound(_) | Self::RendererNotFound(_) | Self::MacroNotFound(_)
        )
    }

    /// Returns true if this is a duplicate slug error.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateField(_))
    }
}

/// A specialized [`Result`] type for form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FormError::DuplicateField("email".into());
        assert_eq!(
            err.to_string(),
            "field with slug 'email' has already been added to this form"
        );

        let err = FormError::invalid_property("skip", "expected a boolean");
        assert_eq!(
            err.to_string(),
            "invalid value for property 'skip': expected a boolean"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(FormError::FieldNotFound("a".into()).is_not_found());
        assert!(FormError::MacroNotFound("a".into()).is_not_found());
        assert!(!FormError::DuplicateField("a".into()).is_not_found());
        assert!(FormError::DuplicateField("a".into()).is_duplicate());
    }

    #[test]
    fn test_from_table_error() {
        assert_eq!(
            FormError::from(TableError::KeyNotFound("x".into())),
            FormError::FieldNotFound("x".into())
        );
        assert!(FormError::from(TableError::DuplicateKey("x".into())).is_duplicate());
    }
}
