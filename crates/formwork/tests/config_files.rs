//! Loading and saving builder configuration files.

use std::fs;

use formwork::{BuilderConfig, ConfigLoadError, ConfigSaveError, FormBuilder};
use tempfile::TempDir;

fn sample() -> BuilderConfig {
    let mut config = BuilderConfig::default();
    config.default_renderer = Some("html".into());
    config.form.slug_char = '-';
    config.form.row_class = "form-row".into();
    config.form.skip_auto_label.push("checkbox".into());
    config
}

#[test]
fn test_toml_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forms.toml");
    sample().to_file(&path).unwrap();
    assert_eq!(BuilderConfig::from_file(&path).unwrap(), sample());
}

#[test]
fn test_json_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forms.json");
    sample().to_file(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"default_renderer\": \"html\""));
    assert_eq!(BuilderConfig::from_file(&path).unwrap(), sample());
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forms.ini");
    fs::write(&path, "x=1").unwrap();
    assert!(matches!(
        BuilderConfig::from_file(&path),
        Err(ConfigLoadError::UnsupportedFormat(ext)) if ext == "ini"
    ));
    assert!(matches!(
        sample().to_file(&path),
        Err(ConfigSaveError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        BuilderConfig::from_file(dir.path().join("absent.toml")),
        Err(ConfigLoadError::Io(_))
    ));
}

#[test]
fn test_loaded_config_drives_builder() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forms.toml");
    fs::write(
        &path,
        "default_renderer = \"missing\"\n\n[form]\nallow_field_overwrite = true\n",
    )
    .unwrap();
    let builder = FormBuilder::with_config(BuilderConfig::from_file(&path).unwrap());
    assert!(builder.config().form.allow_field_overwrite);
    assert_eq!(builder.default_renderer(), Some("missing"));
    assert!(builder.form().unwrap_err().is_not_found());
}
