//! スキャン履歴ストア
//!
//! ユーザーIDで名前空間を分けたスキャン履歴を [`KeyValueStore`] 上に永続化する。
//!
//! - 並び順は挿入順（新しいものが先頭）。読み込み時に並べ替えない
//! - あるユーザーへの読み書きは他ユーザーのエントリに影響しない
//! - 保存データが無い・壊れている場合は空として扱う（`list`/`clear` はエラーを返さない）
//! - 書き込み失敗を呼び出し側へ返すのは `append` のみ
//!
//! 各操作は「全体を読む → メモリ上で変更 → 全体を書き戻す」の1サイクルで、ロックは取らない。
//! 複数タブ・複数プロセスから同時に書くと後勝ちになる（更新が失われうる）。

use crate::error::Result;
use crate::id::{generate_id, iso_timestamp};
use crate::storage::KeyValueStore;
use crate::types::{NewScan, ScanHistoryEntry, RESERVED_ENTRY_KEYS};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 履歴を保存するキー
pub const STORAGE_KEY: &str = "paw_scanHistory_v1";

/// ストレージ上のレイアウト
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageLayout {
    /// 全ユーザーのエントリを1つのキーにまとめる（Webフロントエンドと同じ形式）
    #[default]
    Shared,
    /// ユーザーごとに `<key>:<userId>` へ分ける
    PerUser,
}

impl std::str::FromStr for StorageLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared" => Ok(StorageLayout::Shared),
            "per-user" | "per_user" | "peruser" => Ok(StorageLayout::PerUser),
            _ => Err(format!("Unknown layout: {}. Use shared or per-user", s)),
        }
    }
}

impl std::fmt::Display for StorageLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageLayout::Shared => write!(f, "shared"),
            StorageLayout::PerUser => write!(f, "per-user"),
        }
    }
}

/// ユーザー別スキャン履歴ストア
#[derive(Debug)]
pub struct ScanHistoryStore<S> {
    backend: S,
    layout: StorageLayout,
    base_key: String,
}

impl<S: KeyValueStore> ScanHistoryStore<S> {
    pub fn new(backend: S, layout: StorageLayout) -> Self {
        Self {
            backend,
            layout,
            base_key: STORAGE_KEY.to_string(),
        }
    }

    /// 保存キーを変更（既定は [`STORAGE_KEY`]）
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.base_key = key.into();
        self
    }

    pub fn layout(&self) -> StorageLayout {
        self.layout
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_inner(self) -> S {
        self.backend
    }

    /// ユーザーのエントリが保存されるキー
    pub fn record_key(&self, user_id: &str) -> String {
        match self.layout {
            StorageLayout::Shared => self.base_key.clone(),
            StorageLayout::PerUser => format!("{}:{}", self.base_key, user_id),
        }
    }

    /// ユーザーの履歴を取得（新しい順）
    pub fn list(&self, user_id: &str) -> Vec<ScanHistoryEntry> {
        self.read_collection(&self.record_key(user_id))
            .into_iter()
            .filter(|value| owned_by(value, user_id))
            .filter_map(|value| match serde_json::from_value::<ScanHistoryEntry>(value) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(user_id, error = %e, "skipping undecodable scan history entry");
                    None
                }
            })
            .collect()
    }

    /// 履歴を先頭に追加し、作成したエントリを返す
    ///
    /// 既存データが壊れていれば空として扱う。書き込みに失敗した場合のみエラー。
    pub fn append(&mut self, scan: NewScan, user_id: &str) -> Result<ScanHistoryEntry> {
        let key = self.record_key(user_id);
        let mut collection = self.read_collection(&key);

        let mut extra = scan.extra;
        extra.retain(|name, _| !RESERVED_ENTRY_KEYS.contains(&name.as_str()));

        let now = Utc::now();
        let entry = ScanHistoryEntry {
            id: generate_id(now),
            image: scan.image,
            predicted_breed: scan.predicted_breed,
            confidence: scan.confidence,
            timestamp: iso_timestamp(now),
            user_id: user_id.to_string(),
            extra,
        };

        collection.insert(0, serde_json::to_value(&entry)?);
        self.write_collection(&key, &collection)?;

        tracing::debug!(user_id, id = %entry.id, total = collection.len(), "scan history entry added");
        Ok(entry)
    }

    /// ユーザーの履歴を削除し、削除件数を返す
    ///
    /// 残りが0件ならキーごと削除する。失敗はログに残すだけで呼び出し側には返さない。
    pub fn clear(&mut self, user_id: &str) -> usize {
        let key = self.record_key(user_id);
        let mut collection = self.read_collection(&key);

        let before = collection.len();
        collection.retain(|value| !owned_by(value, user_id));
        let removed = before - collection.len();

        let result = if collection.is_empty() {
            self.backend.remove(&key)
        } else {
            self.write_collection(&key, &collection)
        };

        match result {
            Ok(()) => {
                tracing::debug!(user_id, removed, remaining = collection.len(), "scan history cleared");
                removed
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "failed to clear scan history");
                0
            }
        }
    }

    /// ユーザーの履歴件数
    pub fn count(&self, user_id: &str) -> usize {
        self.list(user_id).len()
    }

    /// タイムスタンプの新しい順に最大 `limit` 件
    ///
    /// 解析できないタイムスタンプは末尾に回す。
    pub fn recent(&self, user_id: &str, limit: usize) -> Vec<ScanHistoryEntry> {
        let mut entries = self.list(user_id);
        entries.sort_by(|a, b| parse_timestamp(&b.timestamp).cmp(&parse_timestamp(&a.timestamp)));
        entries.truncate(limit);
        entries
    }

    /// 共有キーの履歴をユーザー別キーへ移行し、移行件数を返す
    ///
    /// `PerUser` 以外では何もしない。移行先に同じ要素（または同じ `id`）が既にあれば追加しないため、
    /// 途中で失敗しても再実行できる。共有キーは全ユーザーの書き込みが成功した後にだけ書き換え、
    /// `userId` を持たない要素はそこに残す（無ければキーごと削除）。
    pub fn migrate_to_per_user(&mut self) -> Result<usize> {
        if self.layout != StorageLayout::PerUser {
            return Ok(0);
        }

        let shared_key = self.base_key.clone();
        let legacy = self.read_collection(&shared_key);

        let mut by_user: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        let mut unowned = Vec::new();
        for value in legacy {
            match value.get("userId").and_then(Value::as_str) {
                Some(user_id) => by_user.entry(user_id.to_string()).or_default().push(value),
                None => unowned.push(value),
            }
        }

        let mut migrated = 0;
        for (user_id, entries) in by_user {
            let key = self.record_key(&user_id);
            let mut collection = self.read_collection(&key);
            let before = collection.len();
            for value in entries {
                if !already_present(&collection, &value) {
                    collection.push(value);
                }
            }
            if collection.len() == before {
                continue;
            }
            migrated += collection.len() - before;
            self.write_collection(&key, &collection)?;
        }

        if unowned.is_empty() {
            self.backend.remove(&shared_key)?;
        } else {
            tracing::warn!(
                remaining = unowned.len(),
                "scan history elements without userId left under the shared key"
            );
            self.write_collection(&shared_key, &unowned)?;
        }

        tracing::info!(migrated, "scan history migrated to per-user layout");
        Ok(migrated)
    }

    /// 保存済みコレクションを生のJSON値として読む
    ///
    /// 他ユーザーの要素や未知のフィールドをそのまま書き戻せるよう、型付きに変換しない。
    fn read_collection(&self, key: &str) -> Vec<Value> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read scan history; treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(key, "stored scan history is not an array; treating as empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "stored scan history is not valid JSON; treating as empty");
                Vec::new()
            }
        }
    }

    fn write_collection(&mut self, key: &str, collection: &[Value]) -> Result<()> {
        let raw = serde_json::to_string(collection)?;
        self.backend.set(key, &raw)
    }
}

fn owned_by(value: &Value, user_id: &str) -> bool {
    value.get("userId").and_then(Value::as_str) == Some(user_id)
}

/// 同一の要素、または同じ空でない `id` を持つ要素が既にあるか
fn already_present(collection: &[Value], value: &Value) -> bool {
    let id = value.get("id").and_then(Value::as_str).filter(|id| !id.is_empty());
    collection.iter().any(|existing| {
        existing == value || (id.is_some() && existing.get("id").and_then(Value::as_str) == id)
    })
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(timestamp).ok()
}
