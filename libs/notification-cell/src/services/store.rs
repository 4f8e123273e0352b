use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::{ChangeKind, NewNotification, Notification, NotificationError, StoreChange};

const CHANGE_CHANNEL_CAPACITY: usize = 1000;

/// Backing collection for notification records.
///
/// Implementations publish a [`StoreChange`] on [`NotificationStore::changes`]
/// after every successful mutation so listeners can re-query.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Appends one record with a fresh id, the store's clock as `created_at`
    /// and `read = false`.
    async fn insert(&self, draft: NewNotification) -> Result<Notification, NotificationError>;

    /// Records for `recipient_id`, newest first, at most `limit`.
    async fn recent_for_recipient(
        &self,
        recipient_id: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationError>;

    async fn unread_for_recipient(
        &self,
        recipient_id: &str,
    ) -> Result<Vec<Notification>, NotificationError>;

    /// Flips every listed record to read, all or nothing. Returns the number
    /// of records written.
    async fn commit_read_batch(&self, ids: &[String]) -> Result<usize, NotificationError>;

    /// Marks a single record read. The record must belong to `recipient_id`.
    async fn mark_read(
        &self,
        recipient_id: &str,
        notification_id: &str,
    ) -> Result<Notification, NotificationError>;

    fn changes(&self) -> broadcast::Receiver<StoreChange>;
}

struct StoredNotification {
    sequence: u64,
    notification: Notification,
}

/// Process-local store. Used when Supabase is not configured and in tests.
#[derive(Clone)]
pub struct InMemoryNotificationStore {
    records: Arc<RwLock<HashMap<String, StoredNotification>>>,
    changes: broadcast::Sender<StoreChange>,
    sequence: Arc<AtomicU64>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            changes,
            sequence: Arc::new(AtomicU64::new(0)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of write operations committed so far. A batch counts once.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, notification_id: &str) -> Option<Notification> {
        self.records
            .read()
            .await
            .get(notification_id)
            .map(|stored| stored.notification.clone())
    }

    fn publish(&self, recipient_id: &str, kind: ChangeKind) {
        // No receivers is not an error: nobody is listening yet.
        let _ = self.changes.send(StoreChange {
            recipient_id: recipient_id.to_string(),
            kind,
        });
    }
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, draft: NewNotification) -> Result<Notification, NotificationError> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            recipient_id: draft.recipient_id,
            title: draft.title,
            message: draft.message,
            category: draft.category,
            created_at: Utc::now(),
            read: false,
        };

        {
            let mut records = self.records.write().await;
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
            records.insert(
                notification.id.clone(),
                StoredNotification { sequence, notification: notification.clone() },
            );
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        debug!("Stored notification {} for {}", notification.id, notification.recipient_id);
        self.publish(&notification.recipient_id, ChangeKind::Inserted);
        Ok(notification)
    }

    async fn recent_for_recipient(
        &self,
        recipient_id: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationError> {
        let records = self.records.read().await;

        let mut matching: Vec<&StoredNotification> = records
            .values()
            .filter(|stored| stored.notification.recipient_id == recipient_id)
            .collect();

        matching.sort_by(|a, b| {
            b.notification
                .created_at
                .cmp(&a.notification.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });

        Ok(matching
            .into_iter()
            .take(limit)
            .map(|stored| stored.notification.clone())
            .collect())
    }

    async fn unread_for_recipient(
        &self,
        recipient_id: &str,
    ) -> Result<Vec<Notification>, NotificationError> {
        let records = self.records.read().await;

        Ok(records
            .values()
            .filter(|stored| {
                stored.notification.recipient_id == recipient_id && !stored.notification.read
            })
            .map(|stored| stored.notification.clone())
            .collect())
    }

    async fn commit_read_batch(&self, ids: &[String]) -> Result<usize, NotificationError> {
        let mut recipients: Vec<String> = Vec::new();

        {
            let mut records = self.records.write().await;

            if let Some(missing) = ids.iter().find(|id| !records.contains_key(id.as_str())) {
                return Err(NotificationError::NotFound(missing.clone()));
            }

            for id in ids {
                if let Some(stored) = records.get_mut(id.as_str()) {
                    stored.notification.read = true;
                    if !recipients.contains(&stored.notification.recipient_id) {
                        recipients.push(stored.notification.recipient_id.clone());
                    }
                }
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        for recipient_id in &recipients {
            self.publish(recipient_id, ChangeKind::Read);
        }

        debug!("Committed read batch of {} notifications", ids.len());
        Ok(ids.len())
    }

    async fn mark_read(
        &self,
        recipient_id: &str,
        notification_id: &str,
    ) -> Result<Notification, NotificationError> {
        let updated = {
            let mut records = self.records.write().await;
            match records.get_mut(notification_id) {
                Some(stored) if stored.notification.recipient_id == recipient_id => {
                    stored.notification.read = true;
                    stored.notification.clone()
                }
                _ => return Err(NotificationError::NotFound(notification_id.to_string())),
            }
        };
        self.writes.fetch_add(1, Ordering::SeqCst);

        self.publish(recipient_id, ChangeKind::Read);
        Ok(updated)
    }

    fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
