//! Key-value storage abstraction
//!
//! ブラウザの localStorage と同じ「文字列キー → 文字列値」の最小インターフェース。
//! CLIはファイル、WASMは `window.localStorage`、テストはメモリを使う。

use crate::error::{Error, Result};
use std::collections::HashMap;

/// 永続キーバリューストア
pub trait KeyValueStore {
    /// 値を取得（キーが無ければ `None`）
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// 値を書き込み（上書き）
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// キーを削除（存在しなくてもエラーにしない）
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store, optionally bounded by a total byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota_bytes: Option<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// キーと値の合計バイト数が `quota_bytes` を超える書き込みを拒否する
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn used_bytes_excluding(&self, key: &str) -> u64 {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.quota_bytes {
            let needed = self.used_bytes_excluding(key) + (key.len() + value.len()) as u64;
            if needed > limit {
                return Err(Error::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
