use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use shared_database::SupabaseClient;

use crate::{
    ChangeKind, NewNotification, Notification, NotificationCategory, NotificationError,
    NotificationStore, StoreChange,
};

const NOTIFICATIONS_PATH: &str = "/rest/v1/notifications";

/// Row shape of the `notifications` table. `id` and `created_at` are column
/// defaults assigned by Postgres.
#[derive(Debug, Deserialize)]
struct NotificationRow {
    id: String,
    recipient_id: String,
    title: String,
    message: String,
    category: NotificationCategory,
    created_at: DateTime<Utc>,
    read: bool,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            title: row.title,
            message: row.message,
            category: row.category,
            created_at: row.created_at,
            read: row.read,
        }
    }
}

/// Notification store backed by a Supabase (PostgREST) table.
///
/// Change events cover writes made through this instance only.
pub struct SupabaseNotificationStore {
    supabase: SupabaseClient,
    changes: broadcast::Sender<StoreChange>,
}

impl SupabaseNotificationStore {
    pub fn new(supabase: SupabaseClient) -> Self {
        let (changes, _) = broadcast::channel(1000);
        Self { supabase, changes }
    }

    fn publish(&self, recipient_id: &str, kind: ChangeKind) {
        let _ = self.changes.send(StoreChange {
            recipient_id: recipient_id.to_string(),
            kind,
        });
    }

    async fn select(&self, query: &str) -> Result<Vec<Notification>, NotificationError> {
        let path = format!("{}?{}", NOTIFICATIONS_PATH, query);
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| {
                error!("Notification query failed: {}", e);
                NotificationError::StoreError(e.to_string())
            })?;

        parse_rows(rows)
    }

    async fn update_read(&self, filter: &str) -> Result<Vec<Notification>, NotificationError> {
        let path = format!("{}?{}", NOTIFICATIONS_PATH, filter);
        let rows = self.supabase
            .request_returning(Method::PATCH, &path, json!({ "read": true }))
            .await
            .map_err(|e| {
                error!("Notification update failed: {}", e);
                NotificationError::StoreError(e.to_string())
            })?;

        parse_rows(rows)
    }
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<Notification>, NotificationError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value::<NotificationRow>(row)
                .map(Notification::from)
                .map_err(NotificationError::from)
        })
        .collect()
}

fn eq(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

/// `in.("a","b")` with each value quoted, so reserved characters inside an
/// id are not read as list syntax.
fn in_list(values: &[String]) -> String {
    let quoted = values
        .iter()
        .map(|value| {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            urlencoding::encode(&format!("\"{}\"", escaped)).into_owned()
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", quoted)
}

#[async_trait]
impl NotificationStore for SupabaseNotificationStore {
    async fn insert(&self, draft: NewNotification) -> Result<Notification, NotificationError> {
        let body = json!({
            "recipient_id": draft.recipient_id,
            "title": draft.title,
            "message": draft.message,
            "category": draft.category,
            "read": false
        });

        let rows = self.supabase
            .request_returning(Method::POST, NOTIFICATIONS_PATH, body)
            .await
            .map_err(|e| {
                error!("Notification insert failed: {}", e);
                NotificationError::StoreError(e.to_string())
            })?;

        let notification = parse_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| NotificationError::StoreError("Insert returned no rows".to_string()))?;

        debug!("Created notification {} for {}", notification.id, notification.recipient_id);
        self.publish(&notification.recipient_id, ChangeKind::Inserted);
        Ok(notification)
    }

    async fn recent_for_recipient(
        &self,
        recipient_id: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationError> {
        self.select(&format!(
            "recipient_id={}&order=created_at.desc&limit={}",
            eq(recipient_id),
            limit
        ))
        .await
    }

    async fn unread_for_recipient(
        &self,
        recipient_id: &str,
    ) -> Result<Vec<Notification>, NotificationError> {
        self.select(&format!("recipient_id={}&read=eq.false", eq(recipient_id)))
            .await
    }

    async fn commit_read_batch(&self, ids: &[String]) -> Result<usize, NotificationError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let id_filter = in_list(ids);

        // PostgREST has no multi-statement transaction, so existence is checked
        // first and nothing is patched when an id is missing.
        let existing: Vec<Value> = self.supabase
            .request(Method::GET, &format!("{}?id={}&select=id", NOTIFICATIONS_PATH, id_filter), None, None)
            .await
            .map_err(|e| {
                error!("Notification lookup failed: {}", e);
                NotificationError::StoreError(e.to_string())
            })?;
        let found: HashSet<&str> = existing
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_str))
            .collect();
        if let Some(missing) = ids.iter().find(|id| !found.contains(id.as_str())) {
            warn!("Read batch rejected, notification {} does not exist", missing);
            return Err(NotificationError::NotFound(missing.clone()));
        }

        let updated = self.update_read(&format!("id={}", id_filter)).await?;

        let mut recipients: Vec<&str> = updated.iter().map(|n| n.recipient_id.as_str()).collect();
        recipients.sort_unstable();
        recipients.dedup();
        for recipient_id in recipients {
            self.publish(recipient_id, ChangeKind::Read);
        }

        if updated.len() != ids.len() {
            error!("Read batch updated {} of {} notifications", updated.len(), ids.len());
            return Err(NotificationError::StoreError(format!(
                "read batch updated {} of {} notifications",
                updated.len(),
                ids.len()
            )));
        }

        Ok(updated.len())
    }

    async fn mark_read(
        &self,
        recipient_id: &str,
        notification_id: &str,
    ) -> Result<Notification, NotificationError> {
        let updated = self
            .update_read(&format!("id={}&recipient_id={}", eq(notification_id), eq(recipient_id)))
            .await?;

        let notification = updated
            .into_iter()
            .next()
            .ok_or_else(|| NotificationError::NotFound(notification_id.to_string()))?;

        self.publish(recipient_id, ChangeKind::Read);
        Ok(notification)
    }

    fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
