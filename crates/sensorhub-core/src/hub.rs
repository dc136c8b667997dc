//! The sensor hub: history store plus subscriber registry.
//!
//! [`SensorHub`] is the single owner of sensor state. It is created once
//! per server (or per test) and shared behind an `Arc`; nothing else
//! holds readings or subscribers.

use std::sync::Arc;

use chrono::Utc;
use sensorhub_types::{SensorReading, SubscriberId};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::history::HistoryStore;
use crate::ingest::ReadingDraft;
use crate::subscribers::SubscriberRegistry;

/// Owner of the reading history and the live subscriber set.
///
/// Ingestion holds the history lock across append, trim, and broadcast;
/// [`SensorHub::subscribe`] holds it across registration and the
/// latest-reading lookup. No reading can slip between a subscriber's
/// replay and its live feed, and none is delivered twice.
#[derive(Debug)]
pub struct SensorHub {
    history: Mutex<HistoryStore>,
    subscribers: Arc<SubscriberRegistry>,
}

impl SensorHub {
    /// Create a hub retaining at most `max_readings` readings.
    pub fn new(max_readings: usize) -> Self {
        Self {
            history: Mutex::new(HistoryStore::new(max_readings)),
            subscribers: Arc::new(SubscriberRegistry::new()),
        }
    }

    /// Store a validated reading and push it to matching subscribers.
    pub async fn ingest(&self, draft: ReadingDraft) -> SensorReading {
        let mut history = self.history.lock().await;
        let (reading, evicted) = history.append(draft, Utc::now());
        let delivered = self.subscribers.broadcast(&reading);
        drop(history);

        debug!(
            reading_id = %reading.id,
            device_id = %reading.device_id,
            evicted,
            delivered,
            "reading ingested"
        );
        reading
    }

    /// Most recent reading, optionally for one device.
    pub async fn latest(&self, device_id: Option<&str>) -> Option<SensorReading> {
        self.history.lock().await.latest(device_id).cloned()
    }

    /// Up to `limit` most recent readings, most recent first.
    pub async fn recent(&self, device_id: Option<&str>, limit: usize) -> Vec<SensorReading> {
        self.history.lock().await.recent(device_id, limit)
    }

    /// Open a live subscription.
    ///
    /// Returns the current latest matching reading (the only replay a new
    /// subscriber gets) together with the subscription itself.
    pub async fn subscribe(&self, device_id: Option<String>) -> (Option<SensorReading>, Subscription) {
        let history = self.history.lock().await;
        let latest = history.latest(device_id.as_deref()).cloned();
        let (id, receiver) = self.subscribers.register(device_id);
        drop(history);

        let subscription = Subscription {
            id,
            receiver,
            registry: Arc::clone(&self.subscribers),
        };
        (latest, subscription)
    }

    /// Number of readings currently stored.
    pub async fn len(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Whether the history is empty.
    pub async fn is_empty(&self) -> bool {
        self.history.lock().await.is_empty()
    }

    /// Number of open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Clear the history and rewind the identifier counter.
    ///
    /// Open subscriptions stay connected.
    pub async fn reset(&self) {
        self.history.lock().await.reset();
    }
}

/// A live feed of readings for one stream connection.
///
/// Dropping it removes the subscriber from the registry, whichever way
/// the connection ended.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::UnboundedReceiver<SensorReading>,
    registry: Arc<SubscriberRegistry>,
}

impl Subscription {
    /// This subscription's registry identity.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next matching reading.
    ///
    /// Returns `None` once the subscription has been removed from the
    /// registry by someone else.
    pub async fn recv(&mut self) -> Option<SensorReading> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.registry.unregister(self.id) {
            debug!(subscriber_id = %self.id, "stream subscriber disconnected");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use sensorhub_types::{Metric, ReadingId};

    use super::*;

    fn draft(device: &str) -> ReadingDraft {
        ReadingDraft {
            device_id: device.to_owned(),
            metrics: BTreeMap::from([(Metric::Humidity, 40.0)]),
            measured_at: None,
        }
    }

    #[tokio::test]
    async fn subscriber_sees_matching_readings_in_order() {
        let hub = SensorHub::new(100);
        let (latest, mut sub) = hub.subscribe(Some(String::from("d1"))).await;
        assert!(latest.is_none());

        hub.ingest(draft("d1")).await;
        hub.ingest(draft("d2")).await;
        hub.ingest(draft("d1")).await;

        assert_eq!(sub.recv().await.unwrap().id, ReadingId(1));
        assert_eq!(sub.recv().await.unwrap().id, ReadingId(3));
        let nothing = tokio::time::timeout(Duration::from_millis(50), sub.recv()).await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn new_subscriber_gets_only_latest_match() {
        let hub = SensorHub::new(100);
        hub.ingest(draft("d1")).await;
        hub.ingest(draft("d1")).await;
        hub.ingest(draft("d2")).await;

        let (latest, _sub) = hub.subscribe(Some(String::from("d1"))).await;
        assert_eq!(latest.unwrap().id, ReadingId(2));

        let (overall, _all) = hub.subscribe(None).await;
        assert_eq!(overall.unwrap().id, ReadingId(3));
    }

    #[tokio::test]
    async fn dropping_a_subscription_unregisters_it() {
        let hub = SensorHub::new(100);
        let (_, sub) = hub.subscribe(None).await;
        assert_eq!(hub.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn history_stays_bounded() {
        let hub = SensorHub::new(2);
        for _ in 0..5 {
            hub.ingest(draft("d1")).await;
        }
        assert_eq!(hub.len().await, 2);
        let ids: Vec<ReadingId> = hub.recent(None, 10).await.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ReadingId(5), ReadingId(4)]);
    }

    #[tokio::test]
    async fn reset_keeps_subscribers() {
        let hub = SensorHub::new(10);
        let (_, mut sub) = hub.subscribe(None).await;
        hub.ingest(draft("d1")).await;
        hub.reset().await;
        assert!(hub.is_empty().await);
        assert_eq!(hub.subscriber_count(), 1);

        let again = hub.ingest(draft("d1")).await;
        assert_eq!(again.id, ReadingId(1));
        assert_eq!(sub.recv().await.unwrap().id, ReadingId(1));
        assert_eq!(sub.recv().await.unwrap().id, ReadingId(1));
    }
}
