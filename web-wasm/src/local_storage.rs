//! `window.localStorage` backed key-value store

use paw_scan_common::{Error, KeyValueStore, Result};
use wasm_bindgen::JsValue;
use web_sys::Storage;

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// ブラウザの localStorage を開く（使えない環境では `None`）
    pub fn open() -> Option<Self> {
        let window = web_sys::window()?;
        match window.local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(e) => {
                web_sys::console::error_2(&"localStorage unavailable".into(), &e);
                None
            }
        }
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| Error::StorageRead(js_message(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // 容量超過時は QuotaExceededError が投げられる
        self.storage
            .set_item(key, value)
            .map_err(|e| Error::StorageWrite(js_message(&e)))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| Error::StorageWrite(js_message(&e)))
    }
}

/// JS例外をメッセージ文字列に変換
fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
