//! Form and builder configuration.
//!
//! Both structs deserialize with every field optional, so a config file only
//! needs the keys it changes:
//!
//! ```toml
//! default_renderer = "html"
//!
//! [form]
//! slug_char = "-"
//! allow_field_overwrite = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-form options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Give new fields a label derived from their slug.
    pub auto_labels: bool,
    /// Field types that never get an automatic label.
    pub skip_auto_label: Vec<String>,
    /// Separator used when converting camelCase references to slugs.
    pub slug_char: char,
    /// Replace an existing field (keeping its position) instead of failing
    /// with `DuplicateField`.
    pub allow_field_overwrite: bool,
    /// Default `method` attribute.
    pub method: String,
    /// CSS class given to row wrappers.
    pub row_class: String,
    /// Renderer name to use instead of the builder's default.
    pub renderer: Option<String>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            auto_labels: true,
            skip_auto_label: ["hidden", "submit", "button", "raw"].map(String::from).to_vec(),
            slug_char: '_',
            allow_field_overwrite: false,
            method: "post".to_string(),
            row_class: "field-row".to_string(),
            renderer: None,
        }
    }
}

impl FormOptions {
    /// Returns true if a new field of `field_type` should get a label.
    pub fn wants_auto_label(&self, field_type: &str) -> bool {
        self.auto_labels && !self.skip_auto_label.iter().any(|t| t == field_type)
    }
}

/// Builder-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Renderer used when a form does not name one.
    pub default_renderer: Option<String>,
    /// Options every new form starts from.
    pub form: FormOptions,
}

impl BuilderConfig {
    /// Load a configuration from JSON text.
    ///
    /// # Errors
    /// Returns `ConfigLoadError` if JSON parsing fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from TOML text.
    ///
    /// # Errors
    /// Returns `ConfigLoadError` if TOML parsing fails.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(toml)?)
    }

    /// Load a configuration from a file (format inferred by extension).
    ///
    /// # Errors
    /// Returns `ConfigLoadError` if reading or parsing fails, or the
    /// extension is neither `json` nor `toml`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("toml") => Self::from_toml(&content),
            Some(ext) => Err(ConfigLoadError::UnsupportedFormat(ext.into())),
            None => Err(ConfigLoadError::UnsupportedFormat("unknown".into())),
        }
    }

    /// Serialize this configuration to JSON.
    ///
    /// # Errors
    /// Returns `ConfigSaveError` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigSaveError> {
        serde_json::to_string_pretty(self).map_err(ConfigSaveError::Json)
    }

    /// Serialize this configuration to TOML.
    ///
    /// # Errors
    /// Returns `ConfigSaveError` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigSaveError> {
        toml::to_string_pretty(self).map_err(ConfigSaveError::Toml)
    }

    /// Save this configuration to a file (format inferred by extension).
    ///
    /// # Errors
    /// Returns `ConfigSaveError` if serialization or writing fails.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigSaveError> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("json") | None => self.to_json()?,
            Some("toml") => self.to_toml()?,
            Some(ext) => return Err(ConfigSaveError::UnsupportedFormat(ext.into())),
        };
        fs::write(path, content).map_err(ConfigSaveError::Io)
    }
}

/// Error loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Error saving a configuration.
#[derive(Error, Debug)]
pub enum ConfigSaveError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FormOptions::default();
        assert!(options.auto_labels);
        assert_eq!(options.slug_char, '_');
        assert_eq!(options.method, "post");
        assert!(options.wants_auto_label("text"));
        assert!(!options.wants_auto_label("hidden"));
    }

    #[test]
    fn test_partial_toml() {
        let config = BuilderConfig::from_toml(
            r#"
            default_renderer = "html"

            [form]
            slug_char = "-"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_renderer.as_deref(), Some("html"));
        assert_eq!(config.form.slug_char, '-');
        assert_eq!(config.form.row_class, "field-row");
    }

    #[test]
    fn test_partial_json() {
        let config = BuilderConfig::from_json(r#"{"form": {"auto_labels": false}}"#).unwrap();
        assert!(!config.form.auto_labels);
        assert_eq!(config.default_renderer, None);
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(
            BuilderConfig::from_json("{"),
            Err(ConfigLoadError::Json(_))
        ));
        assert!(matches!(
            BuilderConfig::from_toml("form = 3"),
            Err(ConfigLoadError::Toml(_))
        ));
    }

    #[test]
    fn test_text_roundtrip() {
        let mut config = BuilderConfig::default();
        config.default_renderer = Some("html".into());
        config.form.allow_field_overwrite = true;
        assert_eq!(BuilderConfig::from_json(&config.to_json().unwrap()).unwrap(), config);
        assert_eq!(BuilderConfig::from_toml(&config.to_toml().unwrap()).unwrap(), config);
    }
}
