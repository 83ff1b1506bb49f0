//! paw-scan: 犬種判定クライアント
//!
//! 推論APIの呼び出し、ファイルベースの履歴保存、CLI定義

pub mod cli;
pub mod config;
pub mod error;
pub mod file_storage;
pub mod logging;
pub mod predictor;
pub mod scanner;
