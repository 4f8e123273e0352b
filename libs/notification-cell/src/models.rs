// libs/notification-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// NOTIFICATION RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    /// Assigned by the store at insert time.
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    AppointmentBooked,
    AppointmentCancelled,
    MessageReceived,
    PrescriptionIssued,
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationCategory::AppointmentBooked => write!(f, "appointment_booked"),
            NotificationCategory::AppointmentCancelled => write!(f, "appointment_cancelled"),
            NotificationCategory::MessageReceived => write!(f, "message_received"),
            NotificationCategory::PrescriptionIssued => write!(f, "prescription_issued"),
        }
    }
}

/// Writer input. Everything the store does not assign itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub recipient_id: String,
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
}

impl NewNotification {
    pub fn new(
        recipient_id: impl Into<String>,
        category: NotificationCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            title: title.into(),
            message: message.into(),
            category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Read,
}

/// Published by a store after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub recipient_id: String,
    pub kind: ChangeKind,
}

// ==============================================================================
// DOMAIN EVENT INPUTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBookedInput {
    pub doctor_id: String,
    pub patient_name: String,
    pub appointment_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCancelledInput {
    pub doctor_id: String,
    pub patient_name: String,
    pub appointment_date: String,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceivedInput {
    pub doctor_id: String,
    pub patient_name: String,
    pub message_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionIssuedInput {
    pub doctor_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub medication: Option<String>,
}

// ==============================================================================
// RESULTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HandlerOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
}

impl HandlerOutcome {
    pub fn created(notification_id: String) -> Self {
        Self { success: true, notification_id: Some(notification_id) }
    }

    pub fn failed() -> Self {
        Self { success: false, notification_id: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated: usize,
}

impl MarkAllReadOutcome {
    pub fn updated(count: usize) -> Self {
        Self { success: true, error: None, updated: count }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), updated: 0 }
    }
}
