use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::get,
};
use tracing::info;

use notification_cell::{
    create_event_router, create_notification_router, InMemoryNotificationStore,
    NotificationState, NotificationStore, SupabaseNotificationStore,
};
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use trigger_cell::{
    create_trigger_router, ChangeTriggerDispatcher, ChatDirectory, DeliveryLedger,
    InMemoryChatDirectory, SupabaseChatDirectory,
};

/// Every component shares one store and one chat directory, built here once.
pub struct Components {
    pub notifications: Arc<NotificationState>,
    pub dispatcher: Arc<ChangeTriggerDispatcher>,
}

impl Components {
    pub fn build(config: Arc<AppConfig>) -> Self {
        let (store, chats): (Arc<dyn NotificationStore>, Arc<dyn ChatDirectory>) =
            if config.is_configured() {
                info!("Using Supabase notification store at {}", config.supabase_url);
                let supabase = SupabaseClient::new(&config);
                (
                    Arc::new(SupabaseNotificationStore::new(supabase.clone())),
                    Arc::new(SupabaseChatDirectory::new(supabase)),
                )
            } else {
                info!("Using in-memory notification store");
                (
                    Arc::new(InMemoryNotificationStore::new()),
                    Arc::new(InMemoryChatDirectory::new()),
                )
            };

        let notifications = Arc::new(NotificationState::new(config.clone(), store));
        let ledger = DeliveryLedger::new(Duration::from_secs(config.dedup_window_secs));
        let dispatcher = Arc::new(ChangeTriggerDispatcher::new(
            notifications.events.clone(),
            chats,
            ledger,
        ));

        Self { notifications, dispatcher }
    }
}

pub fn create_router(components: &Components) -> Router {
    Router::new()
        .route("/", get(|| async { "Medico notification service is running!" }))
        .nest("/events", create_event_router(components.notifications.clone()))
        .nest("/notifications", create_notification_router(components.notifications.clone()))
        .nest("/triggers", create_trigger_router(components.dispatcher.clone()))
}
