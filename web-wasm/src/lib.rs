//! Paw Scan WASM bindings
//!
//! Webフロントエンドから呼ぶスキャン履歴・プロフィールAPI。
//! 保存形式は既存フロントエンドと同じ（`paw_scanHistory_v1` に全ユーザー分をまとめる）。

mod local_storage;

pub use local_storage::LocalStorage;

use paw_scan_common::{
    DogProfile, DogProfileStore, NewScan, ScanHistoryEntry, ScanHistoryStore, StorageLayout,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn history_store() -> Option<ScanHistoryStore<LocalStorage>> {
    LocalStorage::open().map(|storage| ScanHistoryStore::new(storage, StorageLayout::Shared))
}

/// JSON互換の形で変換（None → null）
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(&e.to_string()))
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

/// ユーザーの履歴（新しい順）。読み込めない場合は空配列
#[wasm_bindgen(js_name = "getScanHistory")]
pub fn get_scan_history(user_id: &str) -> Result<JsValue, JsValue> {
    let entries: Vec<ScanHistoryEntry> = history_store()
        .map(|store| store.list(user_id))
        .unwrap_or_default();
    to_js(&entries)
}

/// 履歴を追加して作成したエントリを返す（保存失敗時は例外）
#[wasm_bindgen(js_name = "addScanHistory")]
pub fn add_scan_history(entry: JsValue, user_id: &str) -> Result<JsValue, JsValue> {
    let scan: NewScan = serde_wasm_bindgen::from_value(entry)
        .map_err(|e| js_error(&format!("Invalid scan entry: {}", e)))?;
    let mut store = history_store().ok_or_else(|| js_error("localStorage is not available"))?;

    let created = store.append(scan, user_id).map_err(|e| {
        web_sys::console::error_1(&format!("Error saving scan to history: {}", e).into());
        js_error(&e.to_string())
    })?;
    to_js(&created)
}

/// `addScanHistory` の別名
#[wasm_bindgen(js_name = "saveScanHistory")]
pub fn save_scan_history(entry: JsValue, user_id: &str) -> Result<JsValue, JsValue> {
    add_scan_history(entry, user_id)
}

/// ユーザーの履歴を削除し、削除件数を返す（例外は投げない）
#[wasm_bindgen(js_name = "clearScanHistory")]
pub fn clear_scan_history(user_id: &str) -> u32 {
    history_store()
        .map(|mut store| store.clear(user_id) as u32)
        .unwrap_or(0)
}

/// ユーザーの履歴件数
#[wasm_bindgen(js_name = "countScanHistory")]
pub fn count_scan_history(user_id: &str) -> u32 {
    history_store()
        .map(|store| store.count(user_id) as u32)
        .unwrap_or(0)
}

/// タイムスタンプ順の最近の履歴
#[wasm_bindgen(js_name = "getRecentScans")]
pub fn get_recent_scans(user_id: &str, limit: u32) -> Result<JsValue, JsValue> {
    let entries: Vec<ScanHistoryEntry> = history_store()
        .map(|store| store.recent(user_id, limit as usize))
        .unwrap_or_default();
    to_js(&entries)
}

#[wasm_bindgen(js_name = "getDogProfile")]
pub fn get_dog_profile() -> Result<JsValue, JsValue> {
    let profile = LocalStorage::open().and_then(|storage| DogProfileStore::new(storage).load());
    to_js(&profile)
}

#[wasm_bindgen(js_name = "saveDogProfile")]
pub fn save_dog_profile(profile: JsValue) -> Result<(), JsValue> {
    let profile: DogProfile = serde_wasm_bindgen::from_value(profile)
        .map_err(|e| js_error(&format!("Invalid dog profile: {}", e)))?;
    let storage = LocalStorage::open().ok_or_else(|| js_error("localStorage is not available"))?;
    DogProfileStore::new(storage)
        .save(&profile)
        .map_err(|e| js_error(&e.to_string()))
}

#[wasm_bindgen(js_name = "clearDogProfile")]
pub fn clear_dog_profile() {
    if let Some(storage) = LocalStorage::open() {
        DogProfileStore::new(storage).clear();
    }
}
