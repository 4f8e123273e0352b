use std::sync::Arc;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Appointment, AppointmentStatus, Chat, ChatMessage};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub listener_limit: usize,
    pub snippet_length: usize,
    pub dedup_window_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            listener_limit: 20,
            snippet_length: 50,
            dedup_window_secs: 600,
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: String::new(),
            listener_limit: self.listener_limit,
            snippet_length: self.snippet_length,
            dedup_window_secs: self.dedup_window_secs,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestAppointment;

impl TestAppointment {
    pub fn with_status(doctor_id: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4().to_string(),
            doctor_id: doctor_id.to_string(),
            patient_name: "Jane Doe".to_string(),
            date: "2026-10-20T10:30:00Z".to_string(),
            status,
            cancellation_reason: None,
            updated_at: None,
        }
    }

    pub fn upcoming(doctor_id: &str) -> Appointment {
        Self::with_status(doctor_id, AppointmentStatus::Upcoming)
    }

    pub fn cancelled(doctor_id: &str, reason: Option<&str>) -> Appointment {
        let mut appointment = Self::with_status(doctor_id, AppointmentStatus::Cancelled);
        appointment.cancellation_reason = reason.map(str::to_string);
        appointment
    }
}

pub struct TestChat;

impl TestChat {
    pub fn owned_by(doctor_id: &str) -> Chat {
        Chat {
            id: Uuid::new_v4().to_string(),
            doctor_id: doctor_id.to_string(),
            patient_name: "Jane Doe".to_string(),
        }
    }

    pub fn message(chat: &Chat, sender_id: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            chat_id: chat.id.clone(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
        }
    }
}
