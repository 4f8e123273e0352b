use serde::{Deserialize, Serialize};
use std::fmt;

use shared_models::AppointmentStatus;

/// What a single trigger invocation did. Dispatch never fails outward;
/// errors end up in `Failed` after being logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Notified { notification_id: String },
    Skipped { reason: String },
    Duplicate { key: String },
    Failed { error: String },
}

impl DispatchOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        DispatchOutcome::Skipped { reason: reason.into() }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        DispatchOutcome::Failed { error: error.into() }
    }

    pub fn is_notified(&self) -> bool {
        matches!(self, DispatchOutcome::Notified { .. })
    }
}

/// Deterministic identity of a source write, used to drop redeliveries.
///
/// An appointment key names the full status transition, plus the document's
/// `updatedAt` when the write carries one, so a later re-book or
/// re-cancellation of the same appointment gets a key of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    AppointmentTransition {
        appointment_id: String,
        from: Option<AppointmentStatus>,
        to: AppointmentStatus,
        version: Option<String>,
    },
    MessageCreated { chat_id: String, message_id: String },
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::AppointmentTransition { appointment_id, from, to, version } => {
                match from {
                    Some(from) => write!(f, "appointment:{}:{}->{}", appointment_id, from, to)?,
                    None => write!(f, "appointment:{}:none->{}", appointment_id, to)?,
                }
                match version {
                    Some(version) => write!(f, "@{}", version),
                    None => Ok(()),
                }
            }
            EventKey::MessageCreated { chat_id, message_id } => {
                write!(f, "message:{}:{}", chat_id, message_id)
            }
        }
    }
}
