//! Generic in-process pub/sub bus for post-commit event fan-out.
//!
//! Topic-keyed broadcast channels. Topics are opaque strings - the bus has
//! no knowledge of what's being published. Publishing is fire-and-forget and
//! never blocks; each subscriber gets its own order-preserving sequence and
//! is responsible for its own backpressure (a lagging subscriber drops its
//! oldest events, never the publisher).

use std::collections::HashMap;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tokio_stream::wrappers::BroadcastStream;

/// Thread-safe, cloneable pub/sub bus keyed by string topics.
///
/// Payloads are `serde_json::Value` - domains serialize their own events.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<Value>>>>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with default capacity (256 events per channel).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new EventBus with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish a JSON value to a topic. No-op if no subscribers.
    pub async fn publish(&self, topic: &str, value: Value) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(topic) {
            // Ignore send errors (no active receivers)
            let _ = tx.send(value);
        }
    }

    /// Subscribe to a topic. Creates the channel if it doesn't exist.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Subscribe to a topic with a per-subscriber filter predicate.
    ///
    /// Events the predicate rejects are silently skipped, as are events the
    /// subscriber lagged past.
    pub async fn subscribe_filtered<F>(
        &self,
        topic: &str,
        predicate: F,
    ) -> impl Stream<Item = Value>
    where
        F: Fn(&Value) -> bool + Send + 'static,
    {
        let rx = self.subscribe(topic).await;
        BroadcastStream::new(rx).filter_map(move |item| {
            let kept = match item {
                Ok(value) if predicate(&value) => Some(value),
                _ => None,
            };
            futures::future::ready(kept)
        })
    }

    /// Remove channels with zero subscribers (housekeeping).
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_subscribe_roundtrip() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe("chat:message_added").await;

        let value = json!({"chatMessageAdded": {"content": "hello"}});
        bus.publish("chat:message_added", value.clone()).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received, value);
    }

    #[tokio::test]
    async fn test_publish_no_subscribers_is_noop() {
        let bus = EventBus::new();
        // Should not panic
        bus.publish("nobody:listening", json!({"data": "dropped"})).await;
    }

    #[tokio::test]
    async fn test_filtered_subscription_skips_rejected_events() {
        let bus = EventBus::new();
        let stream = bus
            .subscribe_filtered("chat:room_count_updated", |v| v["userId"] == "u2")
            .await;
        tokio::pin!(stream);

        bus.publish("chat:room_count_updated", json!({"userId": "u1", "n": 1}))
            .await;
        bus.publish("chat:room_count_updated", json!({"userId": "u2", "n": 2}))
            .await;

        let first = stream.next().await.unwrap();
        assert_eq!(first["n"], 2);
    }

    #[tokio::test]
    async fn test_cleanup_removes_empty_channels() {
        let bus = EventBus::new();
        let rx = bus.subscribe("ephemeral:topic").await;

        assert_eq!(bus.channels.read().await.len(), 1);

        drop(rx);
        bus.cleanup().await;

        assert_eq!(bus.channels.read().await.len(), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe("multi:topic").await;
        let mut rx2 = bus.subscribe("multi:topic").await;

        let value = json!({"type": "broadcast"});
        bus.publish("multi:topic", value.clone()).await;

        assert_eq!(rx1.recv().await.unwrap(), value);
        assert_eq!(rx2.recv().await.unwrap(), value);
    }
}
