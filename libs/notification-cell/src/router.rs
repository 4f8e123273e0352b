use std::sync::Arc;
use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::*;
use crate::NotificationState;

pub fn create_notification_router(state: Arc<NotificationState>) -> Router {
    Router::new()
        .route("/{recipient_id}", get(get_notifications))
        .route("/{recipient_id}/stream", get(stream_notifications))
        .route("/{recipient_id}/read-all", post(mark_all_read))
        .route("/{recipient_id}/{notification_id}/read", post(mark_notification_read))
        .with_state(state)
}

pub fn create_event_router(state: Arc<NotificationState>) -> Router {
    Router::new()
        .route("/appointment-booked", post(appointment_booked))
        .route("/appointment-cancelled", post(appointment_cancelled))
        .route("/message-received", post(message_received))
        .route("/prescription-issued", post(prescription_issued))
        .with_state(state)
}
