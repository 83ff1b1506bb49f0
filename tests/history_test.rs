//! スキャン履歴テスト
//!
//! ファイルストレージ上の履歴ストアについて、ユーザー分離・並び順・破損時の挙動を検証

use paw_scan::file_storage::FileStorage;
use paw_scan_common::{
    KeyValueStore, NewScan, ScanHistoryEntry, ScanHistoryStore, StorageLayout, STORAGE_KEY,
};
use std::path::Path;
use tempfile::tempdir;

const LAYOUTS: [StorageLayout; 2] = [StorageLayout::Shared, StorageLayout::PerUser];

fn open(dir: &Path, layout: StorageLayout) -> ScanHistoryStore<FileStorage> {
    let backend = FileStorage::open(dir).expect("Failed to open storage");
    ScanHistoryStore::new(backend, layout)
}

fn scan(breed: &str, confidence: f64) -> NewScan {
    NewScan::new("data:image/jpeg;base64,/9j/4AAQ", breed, Some(confidence))
}

/// 新しい順（Poodle → Beagle）
#[test]
fn test_list_newest_first() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = open(dir.path(), layout);

        store.append(scan("Beagle", 92.0), "u1").unwrap();
        store.append(scan("Poodle", 77.0), "u1").unwrap();

        let entries = store.list("u1");
        let breeds: Vec<&str> = entries.iter().map(|e| e.predicted_breed.as_str()).collect();
        assert_eq!(breeds, vec!["Poodle", "Beagle"], "layout {}", layout);
        assert_eq!(entries[0].confidence, Some(77.0));
        assert_eq!(entries[1].confidence, Some(92.0));
    }
}

/// 追加直後の先頭は追加したエントリ
#[test]
fn test_append_then_list_first_is_new_entry() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = open(dir.path(), layout);

        store.append(scan("Husky", 50.0), "u1").unwrap();
        let entry = store.append(scan("Corgi", 88.0), "u1").unwrap();

        assert_eq!(store.list("u1").first(), Some(&entry));
    }
}

/// 他ユーザーのエントリは見えない
#[test]
fn test_list_isolated_per_user() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = open(dir.path(), layout);

        store.append(scan("Beagle", 92.0), "u1").unwrap();
        store.append(scan("Pug", 61.0), "u2").unwrap();
        store.append(scan("Poodle", 77.0), "u1").unwrap();
        store.append(scan("Shiba", 99.0), "u2").unwrap();

        let u1 = store.list("u1");
        let u2 = store.list("u2");
        assert_eq!(u1.len(), 2);
        assert_eq!(u2.len(), 2);
        assert!(u1.iter().all(|e| e.user_id == "u1"));
        assert!(u2.iter().all(|e| e.user_id == "u2"));
        assert!(store.list("u3").is_empty());
    }
}

/// ユーザーAへの追加はユーザーBのエントリを変えない
#[test]
fn test_append_does_not_touch_other_users() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = open(dir.path(), layout);

        store.append(scan("Pug", 61.0), "b").unwrap();
        store.append(scan("Shiba", 99.0), "b").unwrap();
        let before: Vec<ScanHistoryEntry> = store.list("b");

        for i in 0..5 {
            store.append(scan(&format!("Breed{}", i), 10.0 * i as f64), "a").unwrap();
        }

        assert_eq!(store.list("b"), before);
    }
}

/// 削除後は空、他ユーザーは残る
#[test]
fn test_clear_only_affects_user() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = open(dir.path(), layout);

        store.append(scan("Beagle", 92.0), "u1").unwrap();
        store.append(scan("Pug", 61.0), "u2").unwrap();
        let u2_before = store.list("u2");

        assert_eq!(store.clear("u1"), 1);
        assert!(store.list("u1").is_empty());
        assert_eq!(store.list("u2"), u2_before);
    }
}

/// 2回削除しても1回と同じ
#[test]
fn test_clear_idempotent() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = open(dir.path(), layout);

        store.append(scan("Beagle", 92.0), "u1").unwrap();
        store.append(scan("Pug", 61.0), "u2").unwrap();

        store.clear("u1");
        let once = store.backend().get(&store.record_key("u2")).unwrap();
        assert_eq!(store.clear("u1"), 0);
        let twice = store.backend().get(&store.record_key("u2")).unwrap();

        assert_eq!(once, twice);
    }
}

/// 最後のエントリを削除するとファイルごと消える
#[test]
fn test_clear_last_entry_removes_file() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut store = open(dir.path(), layout);

        store.append(scan("Beagle", 92.0), "u1").unwrap();
        let path = store.backend().path_for(&store.record_key("u1"));
        assert!(path.exists());

        store.clear("u1");
        assert!(!path.exists());
    }
}

/// 未初期化のストレージは空
#[test]
fn test_list_uninitialized_storage() {
    for layout in LAYOUTS {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = open(dir.path(), layout);
        assert!(store.list("anyone").is_empty());
        assert_eq!(store.count("anyone"), 0);
    }
}

/// 破損したJSONは空として扱う
#[test]
fn test_list_malformed_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut backend = FileStorage::open(dir.path()).unwrap();
    backend.set(STORAGE_KEY, "{not json").unwrap();

    let mut store = ScanHistoryStore::new(backend, StorageLayout::Shared);
    assert!(store.list("u1").is_empty());

    // 破損データの上に追加すると新しいコレクションになる
    store.append(scan("Beagle", 92.0), "u1").unwrap();
    assert_eq!(store.list("u1").len(), 1);
}

/// Webフロントエンドが書いたデータをそのまま読める
#[test]
fn test_reads_web_frontend_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut backend = FileStorage::open(dir.path()).unwrap();
    backend
        .set(
            STORAGE_KEY,
            r#"[{"id":"scan_1760000000000_k3j9x2m1q","image":"data:image/jpeg;base64,AA","predictedBreed":"Beagle","confidence":92,"timestamp":"2026-10-09T08:53:20.000Z","userId":"uid-1"},
                {"id":"scan_1759000000000_aaaaaaaaa","image":"","predictedBreed":"","confidence":null,"timestamp":"2026-09-27T19:06:40.000Z","userId":"uid-2"}]"#,
        )
        .unwrap();
    let store = ScanHistoryStore::new(backend, StorageLayout::Shared);

    let entries = store.list("uid-1");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].predicted_breed, "Beagle");
    assert_eq!(entries[0].confidence, Some(92.0));

    let other = store.list("uid-2");
    assert_eq!(other[0].confidence, None);
}

/// 容量超過は append からエラーとして返る
#[test]
fn test_append_quota_exceeded() {
    let dir = tempdir().expect("Failed to create temp dir");
    let backend = FileStorage::open(dir.path()).unwrap().with_quota(Some(512));
    let mut store = ScanHistoryStore::new(backend, StorageLayout::Shared);

    store.append(scan("Beagle", 92.0), "u1").unwrap();
    let huge = NewScan::new("x".repeat(4096), "Poodle", Some(77.0));
    let result = store.append(huge, "u1");

    assert!(matches!(result, Err(paw_scan_common::Error::QuotaExceeded { .. })));
    assert_eq!(store.list("u1").len(), 1);
}

/// 再オープンしても履歴が残る
#[test]
fn test_history_persists_across_reopen() {
    let dir = tempdir().expect("Failed to create temp dir");
    {
        let mut store = open(dir.path(), StorageLayout::PerUser);
        store.append(scan("Beagle", 92.0), "u1").unwrap();
    }

    let store = open(dir.path(), StorageLayout::PerUser);
    assert_eq!(store.list("u1").len(), 1);
}

/// 共有形式からユーザー別形式への移行
#[test]
fn test_migrate_shared_to_per_user() {
    let dir = tempdir().expect("Failed to create temp dir");
    {
        let mut shared = open(dir.path(), StorageLayout::Shared);
        shared.append(scan("Beagle", 92.0), "u1").unwrap();
        shared.append(scan("Pug", 61.0), "u2").unwrap();
        shared.append(scan("Poodle", 77.0), "u1").unwrap();
    }

    let mut store = open(dir.path(), StorageLayout::PerUser);
    assert!(store.list("u1").is_empty());

    assert_eq!(store.migrate_to_per_user().unwrap(), 3);

    let breeds: Vec<String> = store.list("u1").into_iter().map(|e| e.predicted_breed).collect();
    assert_eq!(breeds, vec!["Poodle", "Beagle"]);
    assert_eq!(store.list("u2").len(), 1);
    assert!(!store.backend().path_for(STORAGE_KEY).exists());
}
