use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use shared_config::DEFAULT_LISTENER_LIMIT;

use crate::{Notification, NotificationStore, StoreChange};

type SnapshotSink = Box<dyn Fn(Vec<Notification>) -> bool + Send + Sync>;

/// Live, per-recipient view of the notification store.
///
/// Each subscription delivers the current snapshot immediately and again
/// after every store change for that recipient. A snapshot is the full
/// ordered list (newest first, capped), never a diff.
///
/// Redelivery follows the store's change feed. With
/// [`SupabaseNotificationStore`](crate::SupabaseNotificationStore) that feed
/// only sees writes made through this process, so rows written by other
/// services show up on the next local change.
#[derive(Clone)]
pub struct NotificationListener {
    store: Arc<dyn NotificationStore>,
    limit: usize,
}

impl NotificationListener {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self {
            store,
            limit: DEFAULT_LISTENER_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Calls `callback` with every snapshot until the returned handle is
    /// unsubscribed or dropped. The callback must not unsubscribe its own
    /// handle.
    pub fn subscribe<F>(&self, recipient_id: &str, callback: F) -> Subscription
    where
        F: Fn(Vec<Notification>) + Send + Sync + 'static,
    {
        self.start(
            recipient_id,
            Box::new(move |snapshot| {
                callback(snapshot);
                true
            }),
        )
    }

    /// Channel form of [`NotificationListener::subscribe`].
    pub fn listen(&self, recipient_id: &str) -> NotificationFeed {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = self.start(
            recipient_id,
            Box::new(move |snapshot| sender.send(snapshot).is_ok()),
        );

        NotificationFeed { receiver, subscription }
    }

    fn start(&self, recipient_id: &str, sink: SnapshotSink) -> Subscription {
        if recipient_id.trim().is_empty() {
            error!("Cannot listen for notifications without a recipient id");
            return Subscription::noop();
        }

        // Subscribe before the first query so no write between the two is missed.
        let changes = self.store.changes();
        let gate = Arc::new(DeliveryGate::new(sink));

        let task = tokio::spawn(run_subscription(
            self.store.clone(),
            recipient_id.to_string(),
            self.limit,
            changes,
            gate.clone(),
        ));

        info!("Notification listener started for {}", recipient_id);
        Subscription {
            gate: Some(gate),
            task: Some(task),
        }
    }
}

async fn run_subscription(
    store: Arc<dyn NotificationStore>,
    recipient_id: String,
    limit: usize,
    mut changes: broadcast::Receiver<StoreChange>,
    gate: Arc<DeliveryGate>,
) {
    if !deliver_snapshot(store.as_ref(), &recipient_id, limit, &gate).await {
        return;
    }

    loop {
        match changes.recv().await {
            Ok(change) if change.recipient_id == recipient_id => {}
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Listener for {} lagged by {} changes, resyncing", recipient_id, skipped);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Change stream closed, ending listener for {}", recipient_id);
                break;
            }
        }

        if !deliver_snapshot(store.as_ref(), &recipient_id, limit, &gate).await {
            break;
        }
    }
}

/// Queries and delivers one snapshot. Returns false once the subscriber is gone.
async fn deliver_snapshot(
    store: &dyn NotificationStore,
    recipient_id: &str,
    limit: usize,
    gate: &DeliveryGate,
) -> bool {
    match store.recent_for_recipient(recipient_id, limit).await {
        Ok(snapshot) => gate.deliver(snapshot),
        Err(e) => {
            // Query failures never reach the subscriber.
            error!("Notification listener query failed for {}: {}", recipient_id, e);
            gate.is_open()
        }
    }
}

/// Serializes deliveries against unsubscription: once `close` returns, the
/// sink is never invoked again.
struct DeliveryGate {
    sink: Mutex<Option<SnapshotSink>>,
}

impl DeliveryGate {
    fn new(sink: SnapshotSink) -> Self {
        Self { sink: Mutex::new(Some(sink)) }
    }

    fn deliver(&self, snapshot: Vec<Notification>) -> bool {
        let mut guard = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let keep_open = match guard.as_ref() {
            Some(sink) => sink(snapshot),
            None => return false,
        };

        if !keep_open {
            *guard = None;
        }
        keep_open
    }

    fn is_open(&self) -> bool {
        self.sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    fn close(&self) {
        let mut guard = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }
}

/// Cancellation handle for a listener subscription. Dropping it unsubscribes.
pub struct Subscription {
    gate: Option<Arc<DeliveryGate>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Handle for a subscription that was never established.
    pub fn noop() -> Self {
        Self { gate: None, task: None }
    }

    pub fn is_active(&self) -> bool {
        self.gate.as_ref().map(|gate| gate.is_open()).unwrap_or(false)
    }

    /// Stops the subscription. No snapshot is delivered after this returns.
    pub fn unsubscribe(&mut self) {
        if let Some(gate) = self.gate.take() {
            gate.close();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Receiving end of [`NotificationListener::listen`].
pub struct NotificationFeed {
    receiver: mpsc::UnboundedReceiver<Vec<Notification>>,
    subscription: Subscription,
}

impl NotificationFeed {
    /// Next snapshot, or `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<Vec<Notification>> {
        self.receiver.recv().await
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    pub fn unsubscribe(&mut self) {
        self.subscription.unsubscribe();
        self.receiver.close();
    }
}
