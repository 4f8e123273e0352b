use tracing::{error, info};

use shared_config::DEFAULT_SNIPPET_LENGTH;
use shared_utils::{format_appointment_date, message_snippet};

use crate::{
    AppointmentBookedInput, AppointmentCancelledInput, HandlerOutcome, MessageReceivedInput,
    NewNotification, NotificationCategory, NotificationError, NotificationWriter, Notification,
    PrescriptionIssuedInput,
};

/// One handler per domain event. Each composes a single-sentence message,
/// hands it to the writer and reports the result as a [`HandlerOutcome`];
/// store failures are logged here and never returned as errors.
#[derive(Clone)]
pub struct DomainEventHandlers {
    writer: NotificationWriter,
    snippet_length: usize,
}

impl DomainEventHandlers {
    pub fn new(writer: NotificationWriter) -> Self {
        Self {
            writer,
            snippet_length: DEFAULT_SNIPPET_LENGTH,
        }
    }

    pub fn with_snippet_length(mut self, snippet_length: usize) -> Self {
        self.snippet_length = snippet_length;
        self
    }

    pub async fn appointment_booked(&self, input: AppointmentBookedInput) -> HandlerOutcome {
        let message = format!(
            "{} booked an appointment for {}.",
            input.patient_name,
            format_appointment_date(&input.appointment_date)
        );

        let draft = NewNotification::new(
            input.doctor_id,
            NotificationCategory::AppointmentBooked,
            "New Appointment Booked",
            message,
        );
        self.dispatch(draft).await
    }

    pub async fn appointment_cancelled(&self, input: AppointmentCancelledInput) -> HandlerOutcome {
        let mut message = format!(
            "{} cancelled the appointment on {}.",
            input.patient_name,
            format_appointment_date(&input.appointment_date)
        );

        if let Some(reason) = input.cancellation_reason.as_deref().map(str::trim) {
            if !reason.is_empty() {
                message.push_str(&format!(" Reason: {}", reason));
            }
        }

        let draft = NewNotification::new(
            input.doctor_id,
            NotificationCategory::AppointmentCancelled,
            "Appointment Cancelled",
            message,
        );
        self.dispatch(draft).await
    }

    pub async fn message_received(&self, input: MessageReceivedInput) -> HandlerOutcome {
        let message = format!(
            "{} sent you a message: \"{}\"",
            input.patient_name,
            message_snippet(&input.message_text, self.snippet_length)
        );

        let draft = NewNotification::new(
            input.doctor_id,
            NotificationCategory::MessageReceived,
            "New Message",
            message,
        );
        self.dispatch(draft).await
    }

    pub async fn prescription_issued(&self, input: PrescriptionIssuedInput) -> HandlerOutcome {
        let message = match input.medication.as_deref().map(str::trim) {
            Some(medication) if !medication.is_empty() => format!(
                "A prescription for {} has been issued to {}.",
                medication, input.patient_name
            ),
            _ => format!("A prescription for {} has been issued.", input.patient_name),
        };

        let draft = NewNotification::new(
            input.doctor_id,
            NotificationCategory::PrescriptionIssued,
            "Prescription Issued",
            message,
        );
        self.dispatch(draft).await
    }

    async fn dispatch(&self, draft: NewNotification) -> HandlerOutcome {
        let category = draft.category;
        let recipient_id = draft.recipient_id.clone();

        to_outcome(category, &recipient_id, self.writer.write(draft).await)
    }
}

fn to_outcome(
    category: NotificationCategory,
    recipient_id: &str,
    result: Result<Notification, NotificationError>,
) -> HandlerOutcome {
    match result {
        Ok(notification) => {
            info!("Sent {} notification {} to {}", category, notification.id, recipient_id);
            HandlerOutcome::created(notification.id)
        }
        Err(e) => {
            error!("Failed to send {} notification to '{}': {}", category, recipient_id, e);
            HandlerOutcome::failed()
        }
    }
}
