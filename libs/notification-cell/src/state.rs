use std::sync::Arc;

use shared_config::AppConfig;

use crate::{
    BulkStateUpdater, DomainEventHandlers, NotificationListener, NotificationStore,
    NotificationWriter,
};

/// Components built once at startup around a single store.
#[derive(Clone)]
pub struct NotificationState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn NotificationStore>,
    pub events: DomainEventHandlers,
    pub listener: NotificationListener,
    pub updater: BulkStateUpdater,
}

impl NotificationState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn NotificationStore>) -> Self {
        let writer = NotificationWriter::new(store.clone());

        Self {
            events: DomainEventHandlers::new(writer).with_snippet_length(config.snippet_length),
            listener: NotificationListener::new(store.clone()).with_limit(config.listener_limit),
            updater: BulkStateUpdater::new(store.clone()),
            store,
            config,
        }
    }
}
