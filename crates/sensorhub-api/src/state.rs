//! Shared application state for the API server.
//!
//! [`AppState`] owns every piece of mutable service state: the sensor
//! hub and the to-do list. It is wrapped in an [`Arc`](std::sync::Arc)
//! and injected into handlers through Axum's `State` extractor.

use std::path::PathBuf;
use std::time::Duration;

use sensorhub_core::{SensorHub, ServiceConfig};
use sensorhub_todos::TodoStore;
use tokio::sync::RwLock;

/// Shared state for the Axum application.
#[derive(Debug)]
pub struct AppState {
    /// Sensor history and live subscribers.
    pub hub: SensorHub,
    /// The to-do list.
    pub todos: RwLock<TodoStore>,
    /// Credential expected in `x-device-key` on ingestion.
    pub device_key: String,
    /// Interval between keep-alive comments on open streams.
    pub stream_keepalive: Duration,
    /// Directory served for requests that match no API route.
    pub public_dir: PathBuf,
}

impl AppState {
    /// Create fresh state from the service configuration.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            hub: SensorHub::new(config.max_sensor_readings),
            todos: RwLock::new(TodoStore::new()),
            device_key: config.device_api_key.clone(),
            stream_keepalive: config.stream_keepalive,
            public_dir: config.public_dir.clone(),
        }
    }

    /// Return sensor history and the to-do list to their start-up state.
    ///
    /// Meant for tests that share one server across cases. Open streams
    /// stay connected.
    pub async fn reset(&self) {
        self.hub.reset().await;
        self.todos.write().await.reset();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}
