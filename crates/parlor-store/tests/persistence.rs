//! Round-trip and fail-safe tests for the message store.
//!
//! Every test gets its own temp directory so runs never interfere.

use parlor_protocol::{ChatMessage, RoomId};
use parlor_store::{HISTORY_CAP, MessageStore, key_from_hex};

fn msg(id: u64, text: &str) -> ChatMessage {
    ChatMessage {
        id,
        username: "ada".into(),
        message: text.into(),
        timestamp: "12:00:00".into(),
    }
}

fn room(id: &str) -> RoomId {
    RoomId(id.into())
}

fn test_key() -> [u8; 32] {
    key_from_hex(&"ab".repeat(32)).unwrap()
}

#[tokio::test]
async fn test_plaintext_round_trip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = MessageStore::load(&path, None).await;
    for i in 0..5 {
        store.append(&room("room-a"), msg(i, &format!("message {i}")));
    }
    store.flush_now().await;

    // Simulated restart: a fresh store over the same file.
    let reloaded = MessageStore::load(&path, None).await;
    let history = reloaded.history(&room("room-a"));
    assert_eq!(history.len(), 5);
    for (i, m) in history.iter().enumerate() {
        assert_eq!(m.id, i as u64);
        assert_eq!(m.message, format!("message {i}"));
    }
}

#[tokio::test]
async fn test_encrypted_round_trip_with_same_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = MessageStore::load(&path, Some(test_key())).await;
    store.append(&room("room-a"), msg(1, "hello"));
    store.append(&room("room-b"), msg(2, "world"));
    store.flush_now().await;

    // The raw file must not contain the plaintext.
    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(!raw.contains("hello"), "plaintext leaked to disk");
    assert!(raw.contains("nonce") && raw.contains("tag"));

    let reloaded = MessageStore::load(&path, Some(test_key())).await;
    assert_eq!(reloaded.history(&room("room-a")), vec![msg(1, "hello")]);
    assert_eq!(reloaded.history(&room("room-b")), vec![msg(2, "world")]);
}

#[tokio::test]
async fn test_encrypted_file_without_key_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = MessageStore::load(&path, Some(test_key())).await;
    store.append(&room("room-a"), msg(1, "secret"));
    store.flush_now().await;

    let keyless = MessageStore::load(&path, None).await;
    assert!(keyless.history(&room("room-a")).is_empty());
    assert_eq!(keyless.room_count(), 0);
}

#[tokio::test]
async fn test_wrong_key_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = MessageStore::load(&path, Some(test_key())).await;
    store.append(&room("room-a"), msg(1, "secret"));
    store.flush_now().await;

    let wrong = MessageStore::load(&path, Some([0x77; 32])).await;
    assert!(wrong.history(&room("room-a")).is_empty());
}

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = MessageStore::load(dir.path().join("nothing-here.json"), None).await;
    assert_eq!(store.room_count(), 0);
}

#[tokio::test]
async fn test_corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    tokio::fs::write(&path, b"{{{{ not json").await.unwrap();

    let store = MessageStore::load(&path, None).await;
    assert_eq!(store.room_count(), 0);
}

#[tokio::test]
async fn test_history_cap_evicts_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = MessageStore::load(&path, None).await;
    for i in 0..(HISTORY_CAP as u64 + 25) {
        store.append(&room("room-a"), msg(i, "x"));
    }

    let history = store.history(&room("room-a"));
    assert_eq!(history.len(), HISTORY_CAP);
    // The first 25 ids were evicted.
    assert_eq!(history.first().unwrap().id, 25);
    assert_eq!(history.last().unwrap().id, HISTORY_CAP as u64 + 24);
}

#[tokio::test]
async fn test_orphaned_room_history_survives_restart() {
    // Room ids are random per creation, so history for a deleted room
    // is never shown again — but the store keeps it across restarts.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = MessageStore::load(&path, None).await;
    store.append(&room("room-gone"), msg(1, "orphan"));
    store.flush_now().await;

    let reloaded = MessageStore::load(&path, None).await;
    assert_eq!(reloaded.room_count(), 1);
    assert_eq!(reloaded.history(&room("room-gone")).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_appends_within_window_coalesce_into_one_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let store = MessageStore::load(&path, None).await;
    store.append(&room("room-a"), msg(1, "one"));
    store.append(&room("room-a"), msg(2, "two"));
    store.append(&room("room-a"), msg(3, "three"));

    // Let the flush task register its sleep, then run the single
    // debounced flush.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::advance(parlor_store::FLUSH_DEBOUNCE).await;
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    store.flush_now().await;

    let reloaded = MessageStore::load(&path, None).await;
    let history = reloaded.history(&room("room-a"));
    assert_eq!(
        history.iter().map(|m| m.id).collect::<Vec<_>>(),
        vec![1, 2, 3],
        "all appends inside the window land in one document"
    );
}
