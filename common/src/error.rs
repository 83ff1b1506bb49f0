//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ストレージからの読み込み失敗（バックエンド固有のメッセージ）
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// ストレージへの書き込み失敗（バックエンド固有のメッセージ）
    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// 容量超過（localStorageのQuotaExceededErrorに相当）
    #[error("Storage quota exceeded: key `{key}` needs {needed} bytes, limit is {limit} bytes")]
    QuotaExceeded {
        key: String,
        needed: u64,
        limit: u64,
    },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
