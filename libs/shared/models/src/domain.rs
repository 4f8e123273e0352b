// libs/shared/models/src/domain.rs
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// SOURCE DOCUMENTS
// ==============================================================================
// Entities owned by the clinic apps. The notification pipeline only reads them.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    pub doctor_id: String,
    pub patient_name: String,
    /// ISO-8601 date or timestamp, as written by the booking UI.
    pub date: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Last-write timestamp maintained by the apps, when they send one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Upcoming,
    Cancelled,
    Completed,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Upcoming => write!(f, "upcoming"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(default)]
    pub id: String,
    pub doctor_id: String,
    pub patient_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub chat_id: String,
    pub sender_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default)]
    pub id: String,
    pub doctor_id: String,
    pub patient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
}

// ==============================================================================
// WRITE SNAPSHOTS
// ==============================================================================

/// Before/after pair for a single document write. A create has no `before`,
/// a delete has no `after`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChange<T> {
    pub before: Option<T>,
    pub after: Option<T>,
}

impl<T> DocumentChange<T> {
    pub fn created(after: T) -> Self {
        Self { before: None, after: Some(after) }
    }

    pub fn updated(before: T, after: T) -> Self {
        Self { before: Some(before), after: Some(after) }
    }

    pub fn is_create(&self) -> bool {
        self.before.is_none() && self.after.is_some()
    }

    pub fn is_delete(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }
}
