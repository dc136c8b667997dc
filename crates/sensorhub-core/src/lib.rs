//! Core of the sensor telemetry service.
//!
//! Everything here is transport-agnostic: the HTTP layer in
//! `sensorhub-api` parses requests, calls into [`SensorHub`], and
//! renders the results.
//!
//! - [`config`] -- Environment-driven service configuration
//! - [`history`] -- Bounded, FIFO-evicting history of readings
//! - [`ingest`] -- Validation of raw ingestion payloads
//! - [`subscribers`] -- Registry of live stream subscribers
//! - [`hub`] -- [`SensorHub`], which ties the store and registry together
//!
//! # Ordering
//!
//! [`SensorHub`] serializes append, trim, and broadcast behind one lock,
//! and stream registration takes the same lock. A subscriber therefore
//! sees each matching reading exactly once and in identifier order.

pub mod config;
pub mod history;
pub mod hub;
pub mod ingest;
pub mod subscribers;

pub use config::{ConfigError, ServiceConfig};
pub use history::{HistoryStore, clamp_history_limit};
pub use hub::{SensorHub, Subscription};
pub use ingest::{IngestError, ReadingDraft, normalize_device_id};
pub use subscribers::SubscriberRegistry;
