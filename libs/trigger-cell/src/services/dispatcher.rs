use std::sync::Arc;
use tracing::{debug, error, info, warn};

use notification_cell::{
    AppointmentBookedInput, AppointmentCancelledInput, DomainEventHandlers, HandlerOutcome,
    MessageReceivedInput,
};
use shared_models::{Appointment, AppointmentStatus, ChatMessage, DocumentChange};

use crate::{ChatDirectory, DeliveryLedger, DispatchOutcome, EventKey};

/// Routes document writes on the watched paths to the matching domain event
/// handler.
///
/// Appointment writes are edge-triggered: only a transition into `upcoming`
/// (or into `cancelled`) notifies, so unrelated field edits stay silent.
/// Chat messages notify on creation when a patient sent them. Nothing here
/// retries or propagates an error to the writer of the source document.
#[derive(Clone)]
pub struct ChangeTriggerDispatcher {
    events: DomainEventHandlers,
    chats: Arc<dyn ChatDirectory>,
    ledger: DeliveryLedger,
}

impl ChangeTriggerDispatcher {
    pub fn new(
        events: DomainEventHandlers,
        chats: Arc<dyn ChatDirectory>,
        ledger: DeliveryLedger,
    ) -> Self {
        Self { events, chats, ledger }
    }

    /// `appointments/{appointment_id}`
    pub async fn on_appointment_written(
        &self,
        appointment_id: &str,
        change: DocumentChange<Appointment>,
    ) -> DispatchOutcome {
        let Some(after) = change.after else {
            debug!("Appointment {} deleted, nothing to notify", appointment_id);
            return DispatchOutcome::skipped("appointment deleted");
        };
        let before_status = change.before.map(|before| before.status);
        let key = EventKey::AppointmentTransition {
            appointment_id: appointment_id.to_string(),
            from: before_status.clone(),
            to: after.status.clone(),
            version: after.updated_at.clone(),
        };

        if entered(&before_status, &after.status, AppointmentStatus::Upcoming) {
            let input = AppointmentBookedInput {
                doctor_id: after.doctor_id,
                patient_name: after.patient_name,
                appointment_date: after.date,
            };

            return self.deliver(key, self.events.appointment_booked(input)).await;
        }

        // A cancellation is only meaningful for an appointment that existed before.
        if before_status.is_some() && entered(&before_status, &after.status, AppointmentStatus::Cancelled) {
            let input = AppointmentCancelledInput {
                doctor_id: after.doctor_id,
                patient_name: after.patient_name,
                appointment_date: after.date,
                cancellation_reason: after.cancellation_reason,
            };

            return self.deliver(key, self.events.appointment_cancelled(input)).await;
        }

        debug!(
            "Appointment {} write without status transition ({:?} -> {})",
            appointment_id, before_status, after.status
        );
        DispatchOutcome::skipped("no status transition")
    }

    /// `chats/{chat_id}/messages/{message_id}`
    pub async fn on_chat_message_written(
        &self,
        chat_id: &str,
        message_id: &str,
        change: DocumentChange<ChatMessage>,
    ) -> DispatchOutcome {
        if !change.is_create() {
            debug!("Message {}/{} was not created, ignoring", chat_id, message_id);
            return DispatchOutcome::skipped("not a message creation");
        }
        let Some(message) = change.after else {
            return DispatchOutcome::skipped("not a message creation");
        };

        let chat = match self.chats.get_chat(chat_id).await {
            Ok(Some(chat)) => chat,
            Ok(None) => {
                warn!("Chat {} for message {} not found", chat_id, message_id);
                return DispatchOutcome::skipped(format!("chat {} not found", chat_id));
            }
            Err(e) => {
                error!("Failed to resolve chat {} for message {}: {}", chat_id, message_id, e);
                return DispatchOutcome::failed(e.to_string());
            }
        };

        if message.sender_id == chat.doctor_id {
            debug!("Message {} sent by the chat's doctor, not notifying", message_id);
            return DispatchOutcome::skipped("sent by doctor");
        }

        let key = EventKey::MessageCreated {
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
        };
        let input = MessageReceivedInput {
            doctor_id: chat.doctor_id,
            patient_name: chat.patient_name,
            message_text: message.text,
        };

        self.deliver(key, self.events.message_received(input)).await
    }

    async fn deliver<F>(&self, key: EventKey, handler: F) -> DispatchOutcome
    where
        F: std::future::Future<Output = HandlerOutcome>,
    {
        if !self.ledger.try_claim(&key).await {
            info!("Dropping redelivered trigger {}", key);
            return DispatchOutcome::Duplicate { key: key.to_string() };
        }

        match handler.await {
            HandlerOutcome { success: true, notification_id: Some(notification_id) } => {
                debug!("Trigger {} produced notification {}", key, notification_id);
                DispatchOutcome::Notified { notification_id }
            }
            _ => {
                // Let a redelivery try again.
                self.ledger.release(&key).await;
                error!("Handler for trigger {} failed", key);
                DispatchOutcome::failed(format!("notification for {} was not written", key))
            }
        }
    }
}

/// True when `after` is `target` and `before` (if any) was not.
fn entered(
    before: &Option<AppointmentStatus>,
    after: &AppointmentStatus,
    target: AppointmentStatus,
) -> bool {
    *after == target && before.as_ref() != Some(&target)
}
