//! Bounded history of sensor readings.
//!
//! [`HistoryStore`] keeps readings in arrival order and never holds more
//! than its capacity: once an append pushes it over, the oldest readings
//! are dropped first. It also owns the identifier counter, which starts
//! at 1 and is never rewound except by [`HistoryStore::reset`].

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use sensorhub_types::{ReadingId, SensorReading};

use crate::ingest::ReadingDraft;

/// Number of readings a history query returns when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Largest number of readings a single history query may return.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Ordered, capacity-bounded sequence of readings.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    readings: VecDeque<SensorReading>,
    capacity: usize,
    next_id: ReadingId,
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` readings.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity.min(MAX_HISTORY_LIMIT)),
            capacity,
            next_id: ReadingId::FIRST,
        }
    }

    /// Turn a validated draft into a stored reading.
    ///
    /// Allocates the next identifier, stamps `received_at`, fills in the
    /// measurement time if the device omitted it, appends, and trims.
    /// Returns the stored reading and how many old readings were evicted.
    pub fn append(&mut self, draft: ReadingDraft, received_at: DateTime<Utc>) -> (SensorReading, usize) {
        let id = self.next_id;
        self.next_id = id.next();

        let reading = SensorReading {
            id,
            device_id: draft.device_id,
            metrics: draft.metrics,
            measured_at: draft.measured_at.unwrap_or(received_at),
            received_at,
        };
        self.readings.push_back(reading.clone());
        let evicted = self.trim();
        (reading, evicted)
    }

    /// Drop the oldest readings until the store is within capacity.
    fn trim(&mut self) -> usize {
        let excess = self.readings.len().saturating_sub(self.capacity);
        self.readings.drain(..excess);
        excess
    }

    /// Most recent reading, optionally restricted to one device.
    pub fn latest(&self, device_id: Option<&str>) -> Option<&SensorReading> {
        self.readings.iter().rev().find(|r| r.matches_device(device_id))
    }

    /// Up to `limit` most recent readings, most recent first.
    pub fn recent(&self, device_id: Option<&str>, limit: usize) -> Vec<SensorReading> {
        self.readings
            .iter()
            .rev()
            .filter(|r| r.matches_device(device_id))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Iterate readings oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SensorReading> {
        self.readings.iter()
    }

    /// Number of stored readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether no readings are stored.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Maximum number of readings retained.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Identifier the next appended reading will receive.
    pub const fn next_id(&self) -> ReadingId {
        self.next_id
    }

    /// Restore the process-start state: empty, counter back to 1.
    pub fn reset(&mut self) {
        self.readings.clear();
        self.next_id = ReadingId::FIRST;
    }
}

/// Resolve the raw `limit` query parameter.
///
/// Missing or non-numeric values give [`DEFAULT_HISTORY_LIMIT`]; numbers
/// are truncated toward zero and clamped to `1..=MAX_HISTORY_LIMIT`. A
/// blank value counts as zero and so yields 1.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn clamp_history_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_HISTORY_LIMIT;
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return 1;
    }
    match raw.parse::<f64>() {
        // Clamped into 1..=500 before the cast, so it cannot truncate.
        Ok(n) if n.is_finite() => n.trunc().clamp(1.0, MAX_HISTORY_LIMIT as f64) as usize,
        _ => DEFAULT_HISTORY_LIMIT,
    }
}
