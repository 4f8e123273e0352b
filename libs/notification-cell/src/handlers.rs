use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_models::AppError;

use crate::{
    AppointmentBookedInput, AppointmentCancelledInput, HandlerOutcome, MarkAllReadOutcome,
    MessageReceivedInput, NotificationError, NotificationState, NotificationStore,
    PrescriptionIssuedInput,
};

// ==============================================================================
// DOMAIN EVENTS
// ==============================================================================
// Handler endpoints always answer 200; success is carried in the body.

pub async fn appointment_booked(
    State(state): State<Arc<NotificationState>>,
    Json(input): Json<AppointmentBookedInput>,
) -> Json<HandlerOutcome> {
    Json(state.events.appointment_booked(input).await)
}

pub async fn appointment_cancelled(
    State(state): State<Arc<NotificationState>>,
    Json(input): Json<AppointmentCancelledInput>,
) -> Json<HandlerOutcome> {
    Json(state.events.appointment_cancelled(input).await)
}

pub async fn message_received(
    State(state): State<Arc<NotificationState>>,
    Json(input): Json<MessageReceivedInput>,
) -> Json<HandlerOutcome> {
    Json(state.events.message_received(input).await)
}

pub async fn prescription_issued(
    State(state): State<Arc<NotificationState>>,
    Json(input): Json<PrescriptionIssuedInput>,
) -> Json<HandlerOutcome> {
    Json(state.events.prescription_issued(input).await)
}

// ==============================================================================
// NOTIFICATIONS
// ==============================================================================

/// Latest snapshot for a recipient, the same view a listener receives.
pub async fn get_notifications(
    State(state): State<Arc<NotificationState>>,
    Path(recipient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if recipient_id.trim().is_empty() {
        return Err(NotificationError::MissingRecipient.into());
    }

    let notifications = state
        .store
        .recent_for_recipient(&recipient_id, state.listener.limit())
        .await?;
    let unread = notifications.iter().filter(|n| !n.read).count();

    Ok(Json(json!({
        "notifications": notifications,
        "total": notifications.len(),
        "unread": unread
    })))
}

/// Server-sent events: one `snapshot` event per listener delivery.
pub async fn stream_notifications(
    State(state): State<Arc<NotificationState>>,
    Path(recipient_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    if recipient_id.trim().is_empty() {
        return Err(NotificationError::MissingRecipient.into());
    }

    info!("Opening notification stream for {}", recipient_id);
    let feed = state.listener.listen(&recipient_id);

    // The feed is dropped with the stream when the client disconnects,
    // which ends the subscription.
    let events = stream::unfold(feed, |mut feed| async move {
        let snapshot = feed.recv().await?;
        debug!("Streaming snapshot of {} notifications", snapshot.len());
        Some((Event::default().event("snapshot").json_data(&snapshot), feed))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub async fn mark_all_read(
    State(state): State<Arc<NotificationState>>,
    Path(recipient_id): Path<String>,
) -> Json<MarkAllReadOutcome> {
    Json(state.updater.mark_all_as_read(&recipient_id).await)
}

pub async fn mark_notification_read(
    State(state): State<Arc<NotificationState>>,
    Path((recipient_id, notification_id)): Path<(String, String)>,
) -> Json<MarkAllReadOutcome> {
    Json(state.updater.mark_as_read(&recipient_id, &notification_id).await)
}
