use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;

use notification_cell::{
    DomainEventHandlers, InMemoryNotificationStore, NotificationCategory, NotificationStore,
    NotificationWriter,
};
use shared_models::{AppointmentStatus, Chat, DocumentChange};
use shared_utils::test_utils::{TestAppointment, TestChat};
use trigger_cell::*;

struct Harness {
    store: InMemoryNotificationStore,
    chats: InMemoryChatDirectory,
    dispatcher: ChangeTriggerDispatcher,
}

fn harness_with_ledger(ledger: DeliveryLedger) -> Harness {
    let store = InMemoryNotificationStore::new();
    let chats = InMemoryChatDirectory::new();
    let events = DomainEventHandlers::new(NotificationWriter::new(Arc::new(store.clone())));
    let dispatcher = ChangeTriggerDispatcher::new(events, Arc::new(chats.clone()), ledger);

    Harness { store, chats, dispatcher }
}

fn harness() -> Harness {
    harness_with_ledger(DeliveryLedger::new(Duration::from_secs(600)))
}

async fn notifications_for(store: &InMemoryNotificationStore, recipient_id: &str) -> usize {
    store.recent_for_recipient(recipient_id, 100).await.unwrap().len()
}

struct BrokenDirectory;

#[async_trait]
impl ChatDirectory for BrokenDirectory {
    async fn get_chat(&self, _chat_id: &str) -> Result<Option<Chat>, TriggerError> {
        Err(TriggerError::LookupFailed("connection reset".to_string()))
    }
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[tokio::test]
async fn test_new_upcoming_appointment_notifies_doctor_once() {
    let h = harness();
    let appointment = TestAppointment::upcoming("D1");

    let outcome = h
        .dispatcher
        .on_appointment_written(&appointment.id, DocumentChange::created(appointment.clone()))
        .await;

    assert_matches!(outcome, DispatchOutcome::Notified { .. });
    let records = h.store.recent_for_recipient("D1", 20).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category, NotificationCategory::AppointmentBooked);
    assert_eq!(
        records[0].message,
        "Jane Doe booked an appointment for October 20, 2026 at 10:30 AM."
    );
}

#[tokio::test]
async fn test_transition_into_upcoming_notifies() {
    let h = harness();
    let before = TestAppointment::with_status("D1", AppointmentStatus::Completed);
    let mut after = before.clone();
    after.status = AppointmentStatus::Upcoming;

    let outcome = h
        .dispatcher
        .on_appointment_written(&after.id.clone(), DocumentChange::updated(before, after))
        .await;

    assert!(outcome.is_notified());
    assert_eq!(notifications_for(&h.store, "D1").await, 1);
}

#[tokio::test]
async fn test_edit_of_upcoming_appointment_is_silent() {
    let h = harness();
    let before = TestAppointment::upcoming("D1");
    let mut after = before.clone();
    after.date = "2026-10-21T09:00:00Z".to_string();

    let outcome = h
        .dispatcher
        .on_appointment_written(&after.id.clone(), DocumentChange::updated(before, after))
        .await;

    assert_eq!(outcome, DispatchOutcome::skipped("no status transition"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_non_upcoming_creation_is_silent() {
    let h = harness();
    let appointment = TestAppointment::with_status("D1", AppointmentStatus::Completed);

    let outcome = h
        .dispatcher
        .on_appointment_written(&appointment.id.clone(), DocumentChange::created(appointment))
        .await;

    assert_matches!(outcome, DispatchOutcome::Skipped { .. });
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_deleted_appointment_is_silent() {
    let h = harness();
    let appointment = TestAppointment::upcoming("D1");
    let change = DocumentChange { before: Some(appointment.clone()), after: None };

    let outcome = h.dispatcher.on_appointment_written(&appointment.id, change).await;

    assert_eq!(outcome, DispatchOutcome::skipped("appointment deleted"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_cancellation_notifies_with_reason() {
    let h = harness();
    let before = TestAppointment::upcoming("D1");
    let mut after = TestAppointment::cancelled("D1", Some("Travelling"));
    after.id = before.id.clone();

    let outcome = h
        .dispatcher
        .on_appointment_written(&before.id.clone(), DocumentChange::updated(before, after))
        .await;

    assert!(outcome.is_notified());
    let records = h.store.recent_for_recipient("D1", 20).await.unwrap();
    assert_eq!(records[0].category, NotificationCategory::AppointmentCancelled);
    assert!(records[0].message.ends_with("Reason: Travelling"));
}

#[tokio::test]
async fn test_created_as_cancelled_is_silent() {
    let h = harness();
    let appointment = TestAppointment::cancelled("D1", None);

    let outcome = h
        .dispatcher
        .on_appointment_written(&appointment.id.clone(), DocumentChange::created(appointment))
        .await;

    assert_matches!(outcome, DispatchOutcome::Skipped { .. });
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_redelivered_trigger_notifies_once() {
    let h = harness();
    let appointment = TestAppointment::upcoming("D1");
    let change = DocumentChange::created(appointment.clone());

    let first = h.dispatcher.on_appointment_written(&appointment.id, change.clone()).await;
    let second = h.dispatcher.on_appointment_written(&appointment.id, change).await;

    assert!(first.is_notified());
    assert_eq!(
        second,
        DispatchOutcome::Duplicate { key: format!("appointment:{}:none->upcoming", appointment.id) }
    );
    assert_eq!(notifications_for(&h.store, "D1").await, 1);
}

#[tokio::test]
async fn test_rebooking_within_window_notifies_again() {
    let h = harness();
    let booked = TestAppointment::upcoming("D1");
    let mut cancelled = booked.clone();
    cancelled.status = AppointmentStatus::Cancelled;
    let rebooked = booked.clone();

    let first = h
        .dispatcher
        .on_appointment_written(&booked.id, DocumentChange::created(booked.clone()))
        .await;
    let cancel = h
        .dispatcher
        .on_appointment_written(&booked.id, DocumentChange::updated(booked.clone(), cancelled.clone()))
        .await;
    let rebook = h
        .dispatcher
        .on_appointment_written(&booked.id, DocumentChange::updated(cancelled, rebooked))
        .await;

    assert!(first.is_notified());
    assert!(cancel.is_notified());
    assert!(rebook.is_notified());

    let records = h.store.recent_for_recipient("D1", 20).await.unwrap();
    let booked_count = records
        .iter()
        .filter(|n| n.category == NotificationCategory::AppointmentBooked)
        .count();
    assert_eq!(booked_count, 2);
}

#[tokio::test]
async fn test_repeated_cycles_are_told_apart_by_update_time() {
    let h = harness();
    let mut booked = TestAppointment::upcoming("D1");
    booked.updated_at = Some("2026-10-15T09:00:00Z".to_string());
    let mut cancelled = booked.clone();
    cancelled.status = AppointmentStatus::Cancelled;
    cancelled.updated_at = Some("2026-10-15T09:01:00Z".to_string());
    let mut rebooked = booked.clone();
    rebooked.updated_at = Some("2026-10-15T09:02:00Z".to_string());
    let mut cancelled_again = cancelled.clone();
    cancelled_again.updated_at = Some("2026-10-15T09:03:00Z".to_string());
    let mut rebooked_again = booked.clone();
    rebooked_again.updated_at = Some("2026-10-15T09:04:00Z".to_string());

    let id = booked.id.clone();
    h.dispatcher.on_appointment_written(&id, DocumentChange::created(booked.clone())).await;
    h.dispatcher.on_appointment_written(&id, DocumentChange::updated(booked, cancelled.clone())).await;
    h.dispatcher.on_appointment_written(&id, DocumentChange::updated(cancelled, rebooked.clone())).await;
    h.dispatcher
        .on_appointment_written(&id, DocumentChange::updated(rebooked, cancelled_again.clone()))
        .await;
    let change = DocumentChange::updated(cancelled_again, rebooked_again);
    let last = h.dispatcher.on_appointment_written(&id, change.clone()).await;
    let redelivered = h.dispatcher.on_appointment_written(&id, change).await;

    assert!(last.is_notified());
    assert_matches!(redelivered, DispatchOutcome::Duplicate { .. });
    assert_eq!(notifications_for(&h.store, "D1").await, 5);
}

#[tokio::test]
async fn test_disabled_ledger_lets_duplicates_through() {
    let h = harness_with_ledger(DeliveryLedger::disabled());
    let appointment = TestAppointment::upcoming("D1");
    let change = DocumentChange::created(appointment.clone());

    h.dispatcher.on_appointment_written(&appointment.id, change.clone()).await;
    h.dispatcher.on_appointment_written(&appointment.id, change).await;

    assert_eq!(notifications_for(&h.store, "D1").await, 2);
}

#[tokio::test]
async fn test_failed_handler_is_swallowed_and_retryable() {
    let h = harness();
    let mut appointment = TestAppointment::upcoming("");
    appointment.id = "A-missing-doctor".to_string();
    let change = DocumentChange::created(appointment.clone());

    let first = h.dispatcher.on_appointment_written(&appointment.id, change.clone()).await;
    let second = h.dispatcher.on_appointment_written(&appointment.id, change).await;

    assert_matches!(first, DispatchOutcome::Failed { .. });
    assert_matches!(second, DispatchOutcome::Failed { .. }, "Failure must not be recorded as delivered");
    assert_eq!(h.store.write_count(), 0);
}

// ==============================================================================
// CHAT MESSAGES
// ==============================================================================

#[tokio::test]
async fn test_patient_message_notifies_doctor() {
    let h = harness();
    let chat = TestChat::owned_by("D1");
    h.chats.upsert(chat.clone()).await;
    let message = TestChat::message(&chat, "P1", "I have a question about my dosage");

    let outcome = h
        .dispatcher
        .on_chat_message_written(&chat.id, &message.id.clone(), DocumentChange::created(message))
        .await;

    assert!(outcome.is_notified());
    let records = h.store.recent_for_recipient("D1", 20).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category, NotificationCategory::MessageReceived);
    assert_eq!(
        records[0].message,
        "Jane Doe sent you a message: \"I have a question about my dosage...\""
    );
}

#[tokio::test]
async fn test_doctor_message_is_silent() {
    let h = harness();
    let chat = TestChat::owned_by("D1");
    h.chats.upsert(chat.clone()).await;
    let message = TestChat::message(&chat, "D1", "Take it twice a day");

    let outcome = h
        .dispatcher
        .on_chat_message_written(&chat.id, &message.id.clone(), DocumentChange::created(message))
        .await;

    assert_eq!(outcome, DispatchOutcome::skipped("sent by doctor"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_message_edit_is_silent() {
    let h = harness();
    let chat = TestChat::owned_by("D1");
    h.chats.upsert(chat.clone()).await;
    let before = TestChat::message(&chat, "P1", "helo");
    let mut after = before.clone();
    after.text = "hello".to_string();

    let outcome = h
        .dispatcher
        .on_chat_message_written(&chat.id, &before.id.clone(), DocumentChange::updated(before, after))
        .await;

    assert_eq!(outcome, DispatchOutcome::skipped("not a message creation"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_message_in_unknown_chat_is_skipped() {
    let h = harness();
    let chat = TestChat::owned_by("D1");
    let message = TestChat::message(&chat, "P1", "hello");

    let outcome = h
        .dispatcher
        .on_chat_message_written(&chat.id, &message.id.clone(), DocumentChange::created(message))
        .await;

    assert_matches!(outcome, DispatchOutcome::Skipped { reason } if reason.contains("not found"));
    assert_eq!(h.store.write_count(), 0);
}

#[tokio::test]
async fn test_chat_lookup_failure_is_swallowed() {
    let store = InMemoryNotificationStore::new();
    let events = DomainEventHandlers::new(NotificationWriter::new(Arc::new(store.clone())));
    let dispatcher = ChangeTriggerDispatcher::new(
        events,
        Arc::new(BrokenDirectory),
        DeliveryLedger::disabled(),
    );
    let chat = TestChat::owned_by("D1");
    let message = TestChat::message(&chat, "P1", "hello");

    let outcome = dispatcher
        .on_chat_message_written(&chat.id, &message.id.clone(), DocumentChange::created(message))
        .await;

    assert_eq!(outcome, DispatchOutcome::failed("Parent lookup failed: connection reset"));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_redelivered_message_notifies_once() {
    let h = harness();
    let chat = TestChat::owned_by("D1");
    h.chats.upsert(chat.clone()).await;
    let message = TestChat::message(&chat, "P1", "hello");
    let change = DocumentChange::created(message.clone());

    h.dispatcher.on_chat_message_written(&chat.id, &message.id, change.clone()).await;
    let second = h.dispatcher.on_chat_message_written(&chat.id, &message.id, change).await;

    assert_matches!(second, DispatchOutcome::Duplicate { .. });
    assert_eq!(notifications_for(&h.store, "D1").await, 1);
}
