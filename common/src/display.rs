//! 履歴の表示用変換

use crate::types::ScanHistoryEntry;
use chrono::DateTime;
use serde::Serialize;

/// 犬種が空のときの表示
pub const UNKNOWN_BREED: &str = "Unknown";
/// 日付が無い・解析できないときの表示
pub const NO_DATE: &str = "—";

/// 履歴一覧の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryItemView {
    pub id: String,
    pub breed: String,
    pub image: String,
    pub confidence: Option<f64>,
    pub date: String,
}

impl From<&ScanHistoryEntry> for HistoryItemView {
    fn from(entry: &ScanHistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            breed: display_breed(&entry.predicted_breed).to_string(),
            image: entry.image.clone(),
            confidence: entry.confidence,
            date: display_date(&entry.timestamp),
        }
    }
}

pub fn display_breed(breed: &str) -> &str {
    if breed.trim().is_empty() {
        UNKNOWN_BREED
    } else {
        breed
    }
}

/// `Oct 16, 2026` 形式
pub fn display_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| NO_DATE.to_string())
}

/// 信頼度の表示（`92%` / `—`）
pub fn display_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c.is_finite() => format!("{}%", c.round()),
        _ => NO_DATE.to_string(),
    }
}
