//! ブラウザ上での localStorage 連携テスト (`wasm-pack test --headless --chrome`)

#![cfg(target_arch = "wasm32")]

use paw_scan_common::{KeyValueStore, NewScan, ScanHistoryStore, StorageLayout, STORAGE_KEY};
use paw_scan_wasm::LocalStorage;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_store() -> ScanHistoryStore<LocalStorage> {
    let mut storage = LocalStorage::open().expect("localStorage unavailable");
    storage.remove(STORAGE_KEY).unwrap();
    ScanHistoryStore::new(storage, StorageLayout::Shared)
}

#[wasm_bindgen_test]
fn append_and_list_newest_first() {
    let mut store = fresh_store();
    store.append(NewScan::new("data:,", "Beagle", Some(92.0)), "u1").unwrap();
    store.append(NewScan::new("data:,", "Poodle", Some(77.0)), "u1").unwrap();

    let breeds: Vec<String> = store.list("u1").into_iter().map(|e| e.predicted_breed).collect();
    assert_eq!(breeds, vec!["Poodle", "Beagle"]);

    store.clear("u1");
}

#[wasm_bindgen_test]
fn corrupt_value_reads_as_empty_and_clear_removes_it() {
    let mut storage = LocalStorage::open().expect("localStorage unavailable");
    storage.set(STORAGE_KEY, "{not json").unwrap();

    let mut store = ScanHistoryStore::new(storage, StorageLayout::Shared);
    assert!(store.list("u1").is_empty());

    store.clear("u1");
    assert_eq!(store.backend().get(STORAGE_KEY).unwrap(), None);
}
