use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use voltmon::core::config::Config;
use voltmon::core::power_monitor::SamplingMode;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.default_mode, SamplingMode::Balanced);
    assert_eq!(config.slow_path_interval_secs, 30);
    assert_eq!(config.command_timeout_secs, 5);
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_default_mode(SamplingMode::Eco);
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_empty_or_corrupt_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    fs::write(&path, "   \n").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    fs::write(&path, "{ not json").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{ "default_mode": "Performance" }"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.default_mode, SamplingMode::Performance);
    assert_eq!(config.slow_path_interval_secs, 30);
}

#[test]
fn test_collector_settings() {
    let config = Config {
        slow_path_interval_secs: 60,
        command_timeout_secs: 0,
        ..Config::default()
    };

    assert_eq!(
        config.collector_config().slow_path_interval,
        Duration::from_secs(60)
    );
    assert_eq!(config.command_timeout(), Duration::from_secs(1));
}
