//! Integration tests for configuration loading and data folder resolution
//!
//! Tests that manipulate KIEZ_DATA_DIR are marked with #[serial] so they run
//! sequentially, not in parallel.

use kiez_common::config::{load_toml_config, resolve_data_dir, TomlConfig, DATA_DIR_ENV};
use kiez_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_full_config_file_parses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
data_dir = "/srv/kiez"
transcode_dir = "/var/cache/kiez"
transcoder = "/usr/local/bin/ffmpeg"
cache_extension = "mp3"
transcode_timeout_secs = 60

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.data_dir, Some(PathBuf::from("/srv/kiez")));
    assert_eq!(config.transcode_dir, Some(PathBuf::from("/var/cache/kiez")));
    assert_eq!(config.transcoder(), "/usr/local/bin/ffmpeg");
    assert_eq!(config.cache_extension(), "mp3");
    assert_eq!(config.transcode_timeout_secs(), Some(60));
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
}

#[test]
fn test_malformed_config_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "data_dir = [not valid").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "unexpected error: {err}");
}

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(DATA_DIR_ENV, "/tmp/kiez-env");
    let config = TomlConfig {
        data_dir: Some(PathBuf::from("/tmp/kiez-toml")),
        ..Default::default()
    };

    let resolved = resolve_data_dir(Some(Path::new("/tmp/kiez-cli")), &config);
    assert_eq!(resolved, PathBuf::from("/tmp/kiez-cli"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(DATA_DIR_ENV, "/tmp/kiez-env");
    let config = TomlConfig {
        data_dir: Some(PathBuf::from("/tmp/kiez-toml")),
        ..Default::default()
    };

    assert_eq!(resolve_data_dir(None, &config), PathBuf::from("/tmp/kiez-env"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn test_toml_then_compiled_default() {
    env::remove_var(DATA_DIR_ENV);

    let config = TomlConfig {
        data_dir: Some(PathBuf::from("/tmp/kiez-toml")),
        ..Default::default()
    };
    assert_eq!(resolve_data_dir(None, &config), PathBuf::from("/tmp/kiez-toml"));

    let fallback = resolve_data_dir(None, &TomlConfig::default());
    assert!(!fallback.as_os_str().is_empty());
    assert!(fallback.ends_with("kiez") || fallback.ends_with("kiez_data"));
}
