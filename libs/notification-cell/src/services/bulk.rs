use std::sync::Arc;
use tracing::{debug, error, info};

use crate::{MarkAllReadOutcome, NotificationError, NotificationStore};

/// Read-state mutations. Failures come back as outcomes, never as errors.
///
/// The batch is atomic at the store but not isolated from concurrent
/// inserts: a notification written while the batch runs may stay unread.
#[derive(Clone)]
pub struct BulkStateUpdater {
    store: Arc<dyn NotificationStore>,
}

impl BulkStateUpdater {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn mark_all_as_read(&self, recipient_id: &str) -> MarkAllReadOutcome {
        if recipient_id.trim().is_empty() {
            error!("mark_all_as_read called without a recipient id");
            return MarkAllReadOutcome::failed(NotificationError::MissingRecipient.to_string());
        }

        let unread = match self.store.unread_for_recipient(recipient_id).await {
            Ok(unread) => unread,
            Err(e) => {
                error!("Failed to load unread notifications for {}: {}", recipient_id, e);
                return MarkAllReadOutcome::failed(e.to_string());
            }
        };

        if unread.is_empty() {
            debug!("No unread notifications for {}", recipient_id);
            return MarkAllReadOutcome::updated(0);
        }

        let ids: Vec<String> = unread.into_iter().map(|n| n.id).collect();
        match self.store.commit_read_batch(&ids).await {
            Ok(count) => {
                info!("Marked {} notifications read for {}", count, recipient_id);
                MarkAllReadOutcome::updated(count)
            }
            Err(e) => {
                error!("Read batch failed for {}: {}", recipient_id, e);
                MarkAllReadOutcome::failed(e.to_string())
            }
        }
    }

    /// Single read acknowledgement.
    pub async fn mark_as_read(&self, recipient_id: &str, notification_id: &str) -> MarkAllReadOutcome {
        if recipient_id.trim().is_empty() {
            return MarkAllReadOutcome::failed(NotificationError::MissingRecipient.to_string());
        }

        match self.store.mark_read(recipient_id, notification_id).await {
            Ok(_) => MarkAllReadOutcome::updated(1),
            Err(e) => {
                error!("Failed to mark notification {} read: {}", notification_id, e);
                MarkAllReadOutcome::failed(e.to_string())
            }
        }
    }
}
