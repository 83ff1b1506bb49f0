//! スキャン履歴・推論結果の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - ScanHistoryEntry: 永続化される1件のスキャン記録
//! - NewScan: 追加時に呼び出し側が渡す部分（id/timestamp/userIdは書き込み時に付与）
//! - PredictionResult: 推論APIのレスポンス
//! - DogProfile: 飼い犬プロフィール

use serde::{Deserialize, Deserializer, Serialize};

/// エントリの既知フィールド名（追加フィールドでは上書きさせない）
pub const RESERVED_ENTRY_KEYS: &[&str] = &["id", "image", "predictedBreed", "confidence", "timestamp", "userId"];

/// 未知のフィールド
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// `null` もキー欠損と同じく既定値として読む
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 1件のスキャン記録
///
/// 保存済みデータは欠損・`null` のフィールドを含むことがあるため、すべて既定値で補完して読む。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanHistoryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// data URL またはリモートURL
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub predicted_breed: String,

    /// 0〜100、未取得時は null
    #[serde(default)]
    pub confidence: Option<f64>,

    /// ISO-8601 (UTC, ミリ秒)
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,

    /// 呼び出し側が付けた追加フィールド（そのまま保存・返却する）
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// 履歴追加時の入力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub predicted_breed: String,

    #[serde(default)]
    pub confidence: Option<f64>,

    /// 追加フィールド（`id`/`timestamp`/`userId` は書き込み時の値が優先）
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl NewScan {
    pub fn new(image: impl Into<String>, predicted_breed: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            image: image.into(),
            predicted_breed: predicted_breed.into(),
            confidence,
            extra: ExtraFields::new(),
        }
    }

    /// 推論結果から履歴エントリ入力を組み立てる
    ///
    /// 犬種は `predicted_breed`、空なら top3 の先頭。信頼度は整数に丸める。
    pub fn from_prediction(image: impl Into<String>, prediction: &PredictionResult) -> Self {
        let predicted_breed = if !prediction.predicted_breed.is_empty() {
            prediction.predicted_breed.clone()
        } else {
            prediction
                .top3
                .first()
                .map(|b| b.breed.clone())
                .unwrap_or_default()
        };

        let confidence = prediction
            .confidence
            .filter(|c| c.is_finite())
            .map(f64::round);

        Self {
            image: image.into(),
            predicted_breed,
            confidence,
            extra: ExtraFields::new(),
        }
    }
}

/// 候補犬種とその信頼度
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreedScore {
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub confidence: f64,
}

/// 文字列または文字列配列（APIはどちらも返しうる）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoText {
    Text(String),
    List(Vec<String>),
}

impl InfoText {
    /// 表示用に1行へ連結
    pub fn joined(&self, sep: &str) -> String {
        match self {
            InfoText::Text(s) => s.clone(),
            InfoText::List(items) => items.join(sep),
        }
    }
}

/// 犬種の説明
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedInfo {
    pub nature: Option<InfoText>,
    pub diet: Option<InfoText>,
    pub healthcare_tips: Option<InfoText>,
}

/// 推論APIのレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(default, alias = "predictedBreed")]
    pub predicted_breed: String,

    #[serde(default, alias = "probability")]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub top3: Vec<BreedScore>,

    #[serde(default)]
    pub info: Option<BreedInfo>,

    /// サーバー側でエンコードした画像 (data URL)
    #[serde(default)]
    pub image: Option<String>,

    /// 未知のフィールド
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// 飼い犬プロフィール
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DogProfile {
    pub name: String,
    pub age: String,
    pub birthday: String,
    pub created_at: String,
}
