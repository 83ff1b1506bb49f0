use crate::error::{PawScanError, Result};
use paw_scan_common::StorageLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 推論APIの既定URL（ローカルのFastAPIサーバー）
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
/// ブラウザの localStorage と同じ上限
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub default_user: Option<String>,
    pub storage_dir: Option<PathBuf>,
    pub layout: StorageLayout,
    pub storage_quota_bytes: Option<u64>,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            default_user: None,
            storage_dir: None,
            layout: StorageLayout::PerUser,
            storage_quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            timeout_seconds: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PawScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("paw-scan").join("config.json"))
    }

    /// 推論APIのURL（環境変数を優先）
    pub fn api_url(&self) -> String {
        match std::env::var("PAW_API_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.api_url.clone(),
        }
    }

    /// ユーザーID解決: 引数 → PAW_USER → 設定ファイル
    pub fn resolve_user(&self, cli_user: Option<&str>) -> Result<String> {
        if let Some(user) = cli_user.filter(|u| !u.trim().is_empty()) {
            return Ok(user.to_string());
        }

        if let Ok(user) = std::env::var("PAW_USER") {
            if !user.trim().is_empty() {
                return Ok(user);
            }
        }

        self.default_user
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or(PawScanError::MissingUser)
    }

    /// 保存先ディレクトリ: 引数 → 設定ファイル → `~/.local/share/paw-scan/storage`
    pub fn storage_dir(&self, cli_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.storage_dir {
            return Ok(dir.clone());
        }
        let data = dirs::data_dir()
            .ok_or_else(|| PawScanError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data.join("paw-scan").join("storage"))
    }

    pub fn set_api_url(&mut self, url: String) {
        self.api_url = url.trim_end_matches('/').to_string();
    }

    pub fn set_default_user(&mut self, user: String) {
        self.default_user = Some(user);
    }
}
