#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use notification_cell::*;
use shared_utils::test_utils::TestConfig;

/// Store whose every operation fails, as an unreachable backend would.
pub struct FailingStore {
    changes: broadcast::Sender<StoreChange>,
}

impl FailingStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self { changes }
    }

    fn failure<T>() -> Result<T, NotificationError> {
        Err(NotificationError::StoreError("permission denied".to_string()))
    }
}

#[async_trait]
impl NotificationStore for FailingStore {
    async fn insert(&self, _draft: NewNotification) -> Result<Notification, NotificationError> {
        Self::failure()
    }

    async fn recent_for_recipient(&self, _: &str, _: usize) -> Result<Vec<Notification>, NotificationError> {
        Self::failure()
    }

    async fn unread_for_recipient(&self, _: &str) -> Result<Vec<Notification>, NotificationError> {
        Self::failure()
    }

    async fn commit_read_batch(&self, _: &[String]) -> Result<usize, NotificationError> {
        Self::failure()
    }

    async fn mark_read(&self, _: &str, _: &str) -> Result<Notification, NotificationError> {
        Self::failure()
    }

    fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

pub fn memory_state() -> (Arc<NotificationState>, InMemoryNotificationStore) {
    let store = InMemoryNotificationStore::new();
    let state = NotificationState::new(TestConfig::default().to_arc(), Arc::new(store.clone()));
    (Arc::new(state), store)
}

pub fn draft(recipient_id: &str, message: &str) -> NewNotification {
    NewNotification::new(recipient_id, NotificationCategory::AppointmentBooked, "New Appointment Booked", message)
}
