//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real baseline)
//! - Global → Local: UNION with negation support
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! Environment layers are passed explicitly so the tests never depend on
//! the process environment or a real global config file.

use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

use hierardoc::application::ApplicationError;
use rstest::rstest;

use hierardoc::config::{local_config_path, OutputFormat, Settings};

fn no_env() -> Option<HashMap<String, String>> {
    Some(HashMap::new())
}

#[test]
fn given_local_config_when_load_then_unions_with_defaults() {
    // Arrange
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
format = "flat"

[scan]
file_extensions = ["inc"]
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_layers(None, Some(project.path()), no_env()).unwrap();

    // Assert
    assert_eq!(settings.format, OutputFormat::Flat);
    assert_eq!(settings.scan.file_extensions, vec!["inc", "php"]);
    assert!(!settings.scan.include_empty);
}

#[test]
fn given_global_and_local_config_when_load_then_global_replaces_and_local_unions() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global_path = global_dir.path().join("hierardoc.toml");
    fs::write(
        &global_path,
        r#"
format = "json"

[scan]
file_extensions = ["phtml", "inc"]
include_empty = true
"#,
    )
    .unwrap();

    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
[scan]
file_extensions = ["php", "!inc"]
"#,
    )
    .unwrap();

    // Act
    let settings =
        Settings::load_layers(Some(&global_path), Some(project.path()), no_env()).unwrap();

    // Assert - "php" default was replaced by global, then re-added locally
    assert_eq!(settings.format, OutputFormat::Json);
    assert_eq!(settings.scan.file_extensions, vec!["php", "phtml"]);
    assert!(settings.scan.include_empty);
}

#[test]
fn given_env_override_when_load_then_env_wins_over_files() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "format = \"flat\"\n").unwrap();
    let env = HashMap::from([("HIERARDOC_FORMAT".to_string(), "tree".to_string())]);

    let settings = Settings::load_layers(None, Some(project.path()), Some(env)).unwrap();

    assert_eq!(settings.format, OutputFormat::Tree);
}

#[test]
fn given_missing_files_when_load_then_uses_defaults() {
    let project = TempDir::new().unwrap();
    let absent_global = project.path().join("nope.toml");

    let settings =
        Settings::load_layers(Some(&absent_global), Some(project.path()), no_env()).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "format = [unclosed\n").unwrap();

    let result = Settings::load_layers(None, Some(project.path()), no_env());

    match result {
        Err(ApplicationError::Config { message }) => {
            assert!(message.contains(".hierardoc.toml"), "message: {message}")
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_unknown_format_in_config_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "format = \"yaml\"\n").unwrap();

    let result = Settings::load_layers(None, Some(project.path()), no_env());

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_scan_env_vars_when_load_then_override_nested_settings() {
    let project = TempDir::new().unwrap();
    let env = HashMap::from([
        ("HIERARDOC_SCAN__INCLUDE_EMPTY".to_string(), "true".to_string()),
        (
            "HIERARDOC_SCAN__FILE_EXTENSIONS".to_string(),
            "inc,phtml".to_string(),
        ),
    ]);

    let settings = Settings::load_layers(None, Some(project.path()), Some(env)).unwrap();

    assert!(settings.scan.include_empty);
    assert_eq!(settings.scan.file_extensions, vec!["inc", "phtml"]);
}

#[rstest]
#[case("HIERARDOC_FORMAT", "yaml")]
#[case("HIERARDOC_SCAN__INCLUDE_EMPTY", "maybe")]
fn given_unparsable_env_var_when_load_then_config_error_names_it(
    #[case] var: &str,
    #[case] value: &str,
) {
    let project = TempDir::new().unwrap();
    let env = HashMap::from([(var.to_string(), value.to_string())]);

    let result = Settings::load_layers(None, Some(project.path()), Some(env));

    match result {
        Err(ApplicationError::Config { message }) => {
            assert!(message.contains(var), "message: {message}")
        }
        other => panic!("expected config error, got {other:?}"),
    }
}
