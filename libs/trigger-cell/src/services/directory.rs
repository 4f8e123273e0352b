use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use shared_database::SupabaseClient;
use shared_models::Chat;

use crate::TriggerError;

/// Resolves the parent chat of a message.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, TriggerError>;
}

#[derive(Clone, Default)]
pub struct InMemoryChatDirectory {
    chats: Arc<RwLock<HashMap<String, Chat>>>,
}

impl InMemoryChatDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, chat: Chat) {
        let mut chats = self.chats.write().await;
        chats.insert(chat.id.clone(), chat);
    }
}

#[async_trait]
impl ChatDirectory for InMemoryChatDirectory {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, TriggerError> {
        Ok(self.chats.read().await.get(chat_id).cloned())
    }
}

#[derive(Debug, Deserialize)]
struct ChatRow {
    id: String,
    doctor_id: String,
    patient_name: String,
}

/// Reads the `chats` table through PostgREST.
pub struct SupabaseChatDirectory {
    supabase: SupabaseClient,
}

impl SupabaseChatDirectory {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ChatDirectory for SupabaseChatDirectory {
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, TriggerError> {
        debug!("Resolving chat {}", chat_id);

        let path = format!(
            "/rest/v1/chats?id=eq.{}&select=id,doctor_id,patient_name",
            urlencoding::encode(chat_id)
        );
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| TriggerError::LookupFailed(e.to_string()))?;

        match rows.into_iter().next() {
            Some(row) => {
                let row: ChatRow = serde_json::from_value(row)?;
                Ok(Some(Chat {
                    id: row.id,
                    doctor_id: row.doctor_id,
                    patient_name: row.patient_name,
                }))
            }
            None => Ok(None),
        }
    }
}
