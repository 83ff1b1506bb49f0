use thiserror::Error;

#[derive(Error, Debug)]
pub enum PawScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ユーザーIDが指定されていません。`--user ID`、環境変数 PAW_USER、または `paw-scan config --set-user ID` で指定してください")]
    MissingUser,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("空の画像ファイルです: {0}")]
    EmptyImage(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] paw_scan_common::Error),
}

pub type Result<T> = std::result::Result<T, PawScanError>;
