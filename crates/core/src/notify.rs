//! Cache-updated notifications.
//!
//! The controller announces every network-backed read on the namespace
//! channel. Delivery is fire-and-forget: publishing never fails and never
//! waits for subscribers.

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::Document;

/// Default buffer size for [`BroadcastNotifier`].
const DEFAULT_CAPACITY: usize = 64;

/// Payload published after a network read refreshed the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "trigger", rename_all = "lowercase")]
pub enum CacheEvent {
    Get {
        doc: Document,
    },
    Fetch {
        docs: Vec<Document>,
        index: Option<String>,
        data: Map<String, Value>,
    },
}

/// A [`CacheEvent`] together with the channel it was published on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheUpdate {
    pub channel: String,
    pub event: CacheEvent,
}

/// Notification channel contract.
pub trait Notifier: Send + Sync {
    fn publish(&self, channel: &str, event: CacheEvent);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn publish(&self, _channel: &str, _event: CacheEvent) {}
}

/// Fans notifications out to any number of subscribers over a tokio
/// broadcast channel. Slow subscribers may observe `Lagged`.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<CacheUpdate>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheUpdate> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, channel: &str, event: CacheEvent) {
        let update = CacheUpdate { channel: channel.to_string(), event };
        if self.sender.send(update).is_err() {
            tracing::trace!("no subscribers on {}", channel);
        }
    }
}
