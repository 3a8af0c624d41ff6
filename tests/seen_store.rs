// tests/seen_store.rs
use std::collections::BTreeMap;
use std::fs;

use chrono::{Duration, Utc};
use sky_feed_bot::seen::SeenStore;

#[tokio::test]
async fn persisted_keys_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("seen_posts.json");

    let mut s = SeenStore::open(&path, 7).await;
    assert!(s.is_empty());
    s.insert("forum:1o6a");
    s.insert("microblog:3f1c0a9b2d4e");
    s.persist().await.unwrap();
    assert!(!dir.path().join("state").join("seen_posts.json.tmp").exists());

    let reopened = SeenStore::open(&path, 7).await;
    assert_eq!(reopened.len(), 2);
    assert!(reopened.contains("forum:1o6a"));
    assert!(reopened.contains("microblog:3f1c0a9b2d4e"));
}

#[tokio::test]
async fn file_drops_entries_past_retention() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seen.json");

    let mut s = SeenStore::open(&path, 7).await;
    s.insert_at("forum:old", Utc::now() - Duration::days(8));
    s.insert("forum:new");
    s.persist().await.unwrap();

    // the running process still remembers the old key
    assert!(s.contains("forum:old"));

    let on_disk: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(on_disk.contains_key("forum:new"));
    assert!(!on_disk.contains_key("forum:old"));
}

#[tokio::test]
async fn stale_entries_are_pruned_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seen.json");
    let fresh = (Utc::now() - Duration::hours(1)).to_rfc3339();
    let stale = (Utc::now() - Duration::days(30)).to_rfc3339();
    fs::write(
        &path,
        format!(r#"{{"forum:keep": "{fresh}", "forum:drop": "{stale}"}}"#),
    )
    .unwrap();

    let s = SeenStore::open(&path, 7).await;
    assert!(s.contains("forum:keep"));
    assert!(!s.contains("forum:drop"));
}

#[tokio::test]
async fn corrupt_file_starts_empty_and_is_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seen.json");
    fs::write(&path, "{not json").unwrap();

    let mut s = SeenStore::open(&path, 7).await;
    assert!(s.is_empty());
    s.insert("news:abc");
    s.persist().await.unwrap();

    let again = SeenStore::open(&path, 7).await;
    assert!(again.contains("news:abc"));
}
