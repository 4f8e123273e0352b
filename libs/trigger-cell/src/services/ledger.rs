use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::EventKey;

/// Remembers recently delivered trigger events so a redelivery of the same
/// transition does not notify twice. A zero window disables the ledger.
#[derive(Clone)]
pub struct DeliveryLedger {
    window: Duration,
    claims: Arc<RwLock<HashMap<String, Instant>>>,
}

impl DeliveryLedger {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            claims: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    /// Claims `key` for delivery. Returns false if it was claimed inside the window.
    pub async fn try_claim(&self, key: &EventKey) -> bool {
        if !self.is_enabled() {
            return true;
        }

        let now = Instant::now();
        let mut claims = self.claims.write().await;
        claims.retain(|_, claimed_at| now.duration_since(*claimed_at) < self.window);

        let key = key.to_string();
        if claims.contains_key(&key) {
            debug!("Event {} already delivered", key);
            return false;
        }

        claims.insert(key, now);
        true
    }

    /// Gives a claim back after a failed delivery so a redelivery can retry it.
    pub async fn release(&self, key: &EventKey) {
        if !self.is_enabled() {
            return;
        }

        self.claims.write().await.remove(&key.to_string());
    }

    pub async fn len(&self) -> usize {
        self.claims.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.claims.read().await.is_empty()
    }
}
