//! 設定ファイルテスト

use paw_scan::config::{Config, DEFAULT_API_URL, DEFAULT_QUOTA_BYTES};
use paw_scan_common::StorageLayout;
use tempfile::tempdir;

/// 設定ファイルが無ければ既定値
#[test]
fn test_load_missing_returns_default() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.layout, StorageLayout::PerUser);
    assert_eq!(config.storage_quota_bytes, Some(DEFAULT_QUOTA_BYTES));
    assert!(config.default_user.is_none());
}

/// 保存と再読み込み
#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_api_url("http://192.168.0.10:8000/".to_string());
    config.set_default_user("uid-42".to_string());
    config.layout = StorageLayout::Shared;
    config.save_to(&path).expect("設定保存失敗");

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.api_url, "http://192.168.0.10:8000");
    assert_eq!(loaded.default_user.as_deref(), Some("uid-42"));
    assert_eq!(loaded.layout, StorageLayout::Shared);
}

/// 一部のフィールドのみの設定ファイル
#[test]
fn test_partial_config_fills_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"layout":"shared","timeout_seconds":5}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.layout, StorageLayout::Shared);
    assert_eq!(config.timeout_seconds, 5);
    assert_eq!(config.api_url, DEFAULT_API_URL);
}

/// 壊れた設定ファイルはエラー
#[test]
fn test_corrupt_config_is_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}

/// 保存先ディレクトリの優先順位
#[test]
fn test_storage_dir_precedence() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config {
        storage_dir: Some(dir.path().join("from-config")),
        ..Default::default()
    };

    let cli_dir = dir.path().join("from-cli");
    assert_eq!(config.storage_dir(Some(&cli_dir)).unwrap(), cli_dir);
    assert_eq!(config.storage_dir(None).unwrap(), dir.path().join("from-config"));
}
