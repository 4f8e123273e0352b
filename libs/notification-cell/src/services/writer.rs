use std::sync::Arc;
use tracing::{debug, error};

use crate::{NewNotification, Notification, NotificationError, NotificationStore};

/// Appends notification records. Every call is an insert: no dedup, no merge.
#[derive(Clone)]
pub struct NotificationWriter {
    store: Arc<dyn NotificationStore>,
}

impl NotificationWriter {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn write(&self, draft: NewNotification) -> Result<Notification, NotificationError> {
        if draft.recipient_id.trim().is_empty() {
            error!("Refusing to write {} notification without a recipient", draft.category);
            return Err(NotificationError::MissingRecipient);
        }

        debug!("Writing {} notification for {}", draft.category, draft.recipient_id);
        self.store.insert(draft).await
    }
}
