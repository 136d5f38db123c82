use std::fs;

use ivb_config::{Config, ConfigError, ConfigManager};
use ivb_domain::UnitMode;
use tempfile::tempdir;

#[test]
fn default_config_matches_tracker_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.default_monthly_cap_yen, 200_000);
    assert_eq!(cfg.default_unit_mode, UnitMode::Minor);
    assert_eq!(cfg.backup_retention, 5);
    assert!(cfg.data_dir.is_none());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("home")).expect("manager");

    assert_eq!(manager.load().expect("load"), Config::default());
    assert_eq!(manager.config_path(), dir.path().join("home").join("config.json"));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.default_monthly_cap_yen = 300_000;
    cfg.default_unit_mode = UnitMode::Major;
    cfg.log_filter = Some("invest_budget=debug".into());
    cfg.data_dir = Some(dir.path().join("elsewhere"));

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert_eq!(manager.data_dir(&loaded), dir.path().join("elsewhere"));
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn data_dir_defaults_under_base_dir() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert_eq!(manager.data_dir(&Config::default()), dir.path().join("data"));
}

#[test]
fn corrupted_config_reports_serde_error() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    fs::write(manager.config_path(), "{not json").expect("seed");

    let err = manager.load().expect_err("must fail");
    assert!(matches!(err, ConfigError::Serde(_)));
    assert!(err.to_string().starts_with("config file is not valid JSON"));
}
