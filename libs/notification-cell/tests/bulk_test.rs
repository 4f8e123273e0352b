use std::sync::Arc;

use notification_cell::*;

mod common;
use common::{draft, FailingStore};

#[tokio::test]
async fn test_mark_all_with_nothing_unread_skips_write() {
    let store = InMemoryNotificationStore::new();
    let stored = store.insert(draft("D1", "already seen")).await.unwrap();
    store.mark_read("D1", &stored.id).await.unwrap();
    let writes_before = store.write_count();

    let updater = BulkStateUpdater::new(Arc::new(store.clone()));
    let outcome = updater.mark_all_as_read("D1").await;

    assert_eq!(outcome, MarkAllReadOutcome::updated(0));
    assert_eq!(store.write_count(), writes_before, "No write should be issued");
}

#[tokio::test]
async fn test_mark_all_flips_every_unread_in_one_batch() {
    let store = InMemoryNotificationStore::new();
    for i in 0..4 {
        store.insert(draft("D1", &format!("message {}", i))).await.unwrap();
    }
    store.insert(draft("D2", "someone else")).await.unwrap();
    let writes_before = store.write_count();

    let updater = BulkStateUpdater::new(Arc::new(store.clone()));
    let outcome = updater.mark_all_as_read("D1").await;

    assert!(outcome.success);
    assert_eq!(outcome.updated, 4);
    assert_eq!(store.write_count(), writes_before + 1, "All flips go in a single batch");
    assert!(store.unread_for_recipient("D1").await.unwrap().is_empty());
    assert_eq!(store.unread_for_recipient("D2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_mark_all_reports_store_failure() {
    let updater = BulkStateUpdater::new(Arc::new(FailingStore::new()));

    let outcome = updater.mark_all_as_read("D1").await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("Store operation failed: permission denied")
    );
}

#[tokio::test]
async fn test_mark_all_requires_recipient() {
    let store = InMemoryNotificationStore::new();
    let updater = BulkStateUpdater::new(Arc::new(store.clone()));

    let outcome = updater.mark_all_as_read("").await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Recipient id is required"));
}

#[tokio::test]
async fn test_mark_single_notification_read() {
    let store = InMemoryNotificationStore::new();
    let first = store.insert(draft("D1", "first")).await.unwrap();
    let second = store.insert(draft("D1", "second")).await.unwrap();
    let updater = BulkStateUpdater::new(Arc::new(store.clone()));

    let outcome = updater.mark_as_read("D1", &first.id).await;

    assert_eq!(outcome, MarkAllReadOutcome::updated(1));
    assert!(store.get(&first.id).await.unwrap().read);
    assert!(!store.get(&second.id).await.unwrap().read);
}

#[tokio::test]
async fn test_mark_single_unknown_notification_fails() {
    let store = InMemoryNotificationStore::new();
    let updater = BulkStateUpdater::new(Arc::new(store.clone()));

    let outcome = updater.mark_as_read("D1", "missing").await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("Notification not found: missing"));
}
