//! Unit tests for the SettingsEngine public API.
//!
//! Exercises default loading, persistence of single values, reset, and the
//! validation applied to values read from disk.

use irhub::services::settings_engine::{SettingsEngine, SettingsEngineTrait, PAGE_SIZE_ENV};
use irhub::types::errors::SettingsError;
use irhub::types::settings::ServiceSettings;
use serde_json::json;
use tempfile::TempDir;

/// Helper: a SettingsEngine backed by a file inside `dir`.
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("irhub.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, ServiceSettings::default());
    assert!(engine.get_config_path().ends_with("irhub.json"));
    assert_eq!(settings.page_size, 9);
    assert!(!settings.allow_admin_vote_retraction);
    assert!(settings.seed_defaults);
}

#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("allow_admin_vote_retraction", json!(true))
            .unwrap();
    }

    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();
    assert!(settings.allow_admin_vote_retraction);
}

#[test]
fn test_set_value_unknown_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value("theme", json!("dark"));
    assert!(matches!(result, Err(SettingsError::InvalidKey(_))));
}

#[test]
fn test_set_value_rejects_zero_page_size() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value("page_size", json!(0));
    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
    assert_eq!(engine.get_settings().page_size, 9);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine.set_value("page_size", json!(20)).unwrap();

    engine.reset().unwrap();
    assert_eq!(engine.get_settings(), &ServiceSettings::default());

    let mut reloaded = engine_in_temp(&dir);
    assert_eq!(reloaded.load().unwrap(), ServiceSettings::default());
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("irhub.json"), r#"{"page_size": 4}"#).unwrap();

    let mut engine = engine_in_temp(&dir);
    let settings = engine.load().unwrap();
    assert_eq!(settings.page_size, 4);
    assert_eq!(settings.database_path, "irhub.db");
}

#[test]
fn test_malformed_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("irhub.json"), "{not json").unwrap();

    let mut engine = engine_in_temp(&dir);
    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_page_size_override_from_lookup() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    engine
        .apply_overrides(|name| (name == PAGE_SIZE_ENV).then(|| " 12 ".to_string()))
        .unwrap();
    assert_eq!(engine.get_settings().page_size, 12);

    let result = engine.apply_overrides(|name| (name == PAGE_SIZE_ENV).then(|| "many".to_string()));
    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
}
