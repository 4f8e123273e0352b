use std::sync::Arc;
use axum::{routing::post, Router};

use crate::handlers::{appointment_written, chat_message_written};
use crate::ChangeTriggerDispatcher;

pub fn create_trigger_router(dispatcher: Arc<ChangeTriggerDispatcher>) -> Router {
    Router::new()
        .route("/appointments/{appointment_id}", post(appointment_written))
        .route("/chats/{chat_id}/messages/{message_id}", post(chat_message_written))
        .with_state(dispatcher)
}
