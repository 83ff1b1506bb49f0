//! スキャンID生成
//!
//! `scan_<エポックミリ秒>_<base36 9文字>`。カウンタや調整は不要（衝突確率は無視できる）。

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// 新しいスキャンIDを生成
pub fn generate_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("scan_{}_{}", now.timestamp_millis(), suffix)
}

/// JavaScriptの `Date.toISOString()` と同じ形式（UTC, ミリ秒, `Z`）
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
