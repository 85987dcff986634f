use ocr_extract_lib::cache::HistoryCache;
use ocr_extract_lib::db::SqliteStore;
use ocr_extract_lib::models::{HistoryEntry, HISTORY_CAPACITY};
use ocr_extract_lib::services::normalizer::normalize;
use ocr_extract_lib::store::{KeyValueStore, API_KEY_KEY, HISTORY_KEY};
use serde_json::json;

fn entry(id: i64, html: &str) -> HistoryEntry {
    HistoryEntry {
        id,
        timestamp: "2024-05-01T12:00:00.000Z".to_string(),
        model: "mistral-ocr-2503".to_string(),
        image_label: format!("page-{}.jpg", id),
        source_image: "data:image/jpeg;base64,/9j/4AAQ".to_string(),
        normalized_result: html.to_string(),
    }
}

#[test]
fn history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ocr_extract.db");

    let html = normalize(&json!({
        "pages": [
            { "markdown": "Invoice\n![logo](img-0.jpeg)", "images": [{ "id": "img-0.jpeg", "image_base64": "data:image/jpeg;base64,AAA" }] },
            { "markdown": "Thanks", "images": [] }
        ]
    }));
    assert!(html.starts_with("Invoice<br><img "));
    assert!(html.ends_with("<br><br>Thanks"));

    let saved = {
        let store = SqliteStore::open(&db_path).unwrap();
        let mut history = HistoryCache::load(&store);
        history.insert(entry(1, "first")).unwrap();
        let entries = history.insert(entry(2, &html)).unwrap().to_vec();
        entries
    };

    let store = SqliteStore::open(&db_path).unwrap();
    let history = HistoryCache::load(&store);
    assert_eq!(history.entries(), saved.as_slice());
    assert_eq!(history.restore(2).unwrap().normalized_result, html);
}

#[test]
fn bound_and_clear_hold_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ocr_extract.db");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        store.set(API_KEY_KEY, "sk-test").unwrap();
        let mut history = HistoryCache::load(&store);
        for id in 1..=11 {
            history.insert(entry(id, "text")).unwrap();
        }
    }

    let store = SqliteStore::open(&db_path).unwrap();
    let mut history = HistoryCache::load(&store);
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert_eq!(history.entries()[0].id, 11);
    assert!(history.restore(1).is_none());

    let stored: serde_json::Value = serde_json::from_str(&store.get(HISTORY_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored.as_array().map(|a| a.len()), Some(HISTORY_CAPACITY));
    assert_eq!(stored[0]["imageName"], "page-11.jpg");

    history.clear().unwrap();
    drop(history);
    drop(store);

    let store = SqliteStore::open(&db_path).unwrap();
    assert!(HistoryCache::load(&store).is_empty());
    assert_eq!(store.get(API_KEY_KEY).unwrap().as_deref(), Some("sk-test"));
}

#[test]
fn corrupt_persisted_history_recovers_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("ocr_extract.db")).unwrap();
    store.set(HISTORY_KEY, r#"[{"id": "not a number"}]"#).unwrap();

    let mut history = HistoryCache::load(&store);
    assert!(history.is_empty());
    history.insert(entry(5, "fresh")).unwrap();
    assert_eq!(HistoryCache::load(&store).len(), 1);
}
