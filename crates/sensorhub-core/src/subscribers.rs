//! Registry of live stream subscribers.
//!
//! Each open stream connection registers once and gets an unbounded
//! queue of readings. [`SubscriberRegistry::broadcast`] pushes a reading
//! into the queue of every subscriber whose device filter matches.
//! Delivery is fire-and-forget: a subscriber whose queue has been closed
//! (its connection went away) is dropped from the registry on the spot,
//! and the caller only learns how many deliveries succeeded.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sensorhub_types::{SensorReading, SubscriberId};
use tokio::sync::mpsc;
use tracing::debug;

/// One registered stream connection.
#[derive(Debug)]
struct Subscriber {
    /// Only readings from this device are delivered, when set.
    device_id: Option<String>,
    tx: mpsc::UnboundedSender<SensorReading>,
}

/// Set of live subscribers keyed by connection identity.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<HashMap<SubscriberId, Subscriber>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber with an optional device filter.
    ///
    /// Returns its identity and the receiving end of its queue.
    pub fn register(
        &self,
        device_id: Option<String>,
    ) -> (SubscriberId, mpsc::UnboundedReceiver<SensorReading>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriberId::new();
        debug!(subscriber_id = %id, device_id = ?device_id, "stream subscriber registered");
        self.lock().insert(id, Subscriber { device_id, tx });
        (id, rx)
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Deliver a reading to every matching subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn broadcast(&self, reading: &SensorReading) -> usize {
        let mut delivered: usize = 0;
        self.lock().retain(|id, subscriber| {
            if !reading.matches_device(subscriber.device_id.as_deref()) {
                return true;
            }
            if subscriber.tx.send(reading.clone()).is_ok() {
                delivered = delivered.saturating_add(1);
                true
            } else {
                debug!(subscriber_id = %id, "pruned closed stream subscriber");
                false
            }
        });
        delivered
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section is a plain map operation, so a poisoned
    // lock still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriberId, Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
