use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paw-scan")]
#[command(about = "犬種判定クライアント・スキャン履歴管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ユーザーID（省略時は PAW_USER → 設定ファイル）
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// 保存先ディレクトリ
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真を推論APIに送り犬種を判定
    Predict {
        /// 画像ファイルまたはフォルダ
        #[arg(required = true)]
        path: PathBuf,

        /// 履歴に保存しない
        #[arg(long)]
        no_save: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// スキャン履歴の操作
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// 飼い犬プロフィールの操作
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// 設定を表示/編集
    Config {
        /// 推論APIのURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// 既定のユーザーIDを設定
        #[arg(long)]
        set_user: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// 履歴を新しい順に表示
    List {
        /// 表示件数の上限
        #[arg(short, long)]
        limit: Option<usize>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 最近のスキャン（タイムスタンプ順）
    Recent {
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,
    },

    /// 履歴を手動で追加
    Add {
        /// 画像ファイルのパスまたはURL
        #[arg(long)]
        image: String,

        /// 犬種
        #[arg(long)]
        breed: String,

        /// 信頼度 (0-100)
        #[arg(long, value_parser = parse_confidence)]
        confidence: Option<f64>,
    },

    /// 履歴を削除
    Clear {
        /// 確認せずに削除
        #[arg(short, long)]
        yes: bool,
    },

    /// 共有キーの履歴をユーザー別キーへ移行
    Migrate,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// プロフィールを表示
    Show,

    /// プロフィールを保存
    Set {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        age: String,

        /// 誕生日 (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        birthday: String,
    },

    /// プロフィールを削除
    Clear,
}

/// 信頼度は 0〜100 の範囲のみ受け付ける
pub fn parse_confidence(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("Invalid confidence: {}", s))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("Confidence must be between 0 and 100: {}", s))
    }
}
