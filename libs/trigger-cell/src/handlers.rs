use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use shared_models::{Appointment, ChatMessage, DocumentChange};

use crate::{ChangeTriggerDispatcher, DispatchOutcome};

/// Hook for writes to `appointments/{appointment_id}`.
pub async fn appointment_written(
    State(dispatcher): State<Arc<ChangeTriggerDispatcher>>,
    Path(appointment_id): Path<String>,
    Json(change): Json<DocumentChange<Appointment>>,
) -> Json<DispatchOutcome> {
    info!("Appointment write trigger for {}", appointment_id);
    Json(dispatcher.on_appointment_written(&appointment_id, change).await)
}

/// Hook for writes to `chats/{chat_id}/messages/{message_id}`.
pub async fn chat_message_written(
    State(dispatcher): State<Arc<ChangeTriggerDispatcher>>,
    Path((chat_id, message_id)): Path<(String, String)>,
    Json(change): Json<DocumentChange<ChatMessage>>,
) -> Json<DispatchOutcome> {
    info!("Message write trigger for {}/{}", chat_id, message_id);
    Json(dispatcher.on_chat_message_written(&chat_id, &message_id, change).await)
}
