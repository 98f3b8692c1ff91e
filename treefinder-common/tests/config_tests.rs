//! Integration tests for configuration resolution and graceful degradation
//!
//! Tests that touch TREEFINDER_CONFIG or TREEFINDER_DATA_DIR are marked with
//! #[serial] so the environment is never mutated by two tests at once.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use treefinder_common::config::{
    ensure_data_dir, load_toml_config, resolve_config_path, resolve_data_dir, NativeMode,
    TomlConfig, CONFIG_ENV_VAR, DATABASE_FILE_NAME, DATA_DIR_ENV_VAR,
};
use treefinder_common::Error;

#[test]
#[serial]
fn test_cli_config_path_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let cli = PathBuf::from("/tmp/from-cli.toml");
    let resolved = resolve_config_path(Some(&cli));
    assert_eq!(resolved, Some(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_config_path_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    let config = load_toml_config(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_no_config_path_uses_defaults() {
    let config = load_toml_config(None).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_config_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
bind = "0.0.0.0:8080"

[pipeline]
native_mode = "strict_per_occurrence"
batch_delay_ms = 120

[occurrence]
search_radius_km = 40
"#,
    )
    .unwrap();

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.server.bind, "0.0.0.0:8080");
    assert_eq!(config.pipeline.native_mode, NativeMode::StrictPerOccurrence);
    assert_eq!(config.pipeline.batch_delay_ms, 120);
    assert_eq!(config.occurrence.search_radius_km, 40);
    assert_eq!(config.occurrence.page_size, 300);
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[server\nbind = 1").unwrap();

    let err = load_toml_config(Some(&path)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_data_dir_priority() {
    env::remove_var(DATA_DIR_ENV_VAR);

    let mut config = TomlConfig::default();
    config.database.path = Some(PathBuf::from("/tmp/from-toml"));

    // TOML beats the compiled default
    assert_eq!(resolve_data_dir(None, &config), PathBuf::from("/tmp/from-toml"));

    // ENV beats TOML
    env::set_var(DATA_DIR_ENV_VAR, "/tmp/from-env");
    assert_eq!(resolve_data_dir(None, &config), PathBuf::from("/tmp/from-env"));

    // CLI beats everything
    let cli = PathBuf::from("/tmp/from-cli");
    assert_eq!(resolve_data_dir(Some(&cli), &config), cli);

    env::remove_var(DATA_DIR_ENV_VAR);
}

#[test]
fn test_ensure_data_dir_creates_folder() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("data");

    let db_path = ensure_data_dir(&data_dir).unwrap();

    assert!(data_dir.is_dir());
    assert_eq!(db_path, data_dir.join(DATABASE_FILE_NAME));
}
