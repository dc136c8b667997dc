//! Sensor telemetry API server.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Create the shared application state
//! 4. Bind and serve until `Ctrl-C` / `SIGTERM`

use std::sync::Arc;

use sensorhub_api::{AppState, logging, start_server};
use sensorhub_core::ServiceConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ServiceConfig::from_env()?;
    info!(
        host = %config.host,
        port = config.port,
        max_sensor_readings = config.max_sensor_readings,
        stream_keepalive_secs = config.stream_keepalive.as_secs(),
        public_dir = %config.public_dir.display(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(&config));
    start_server(&config, state).await?;

    Ok(())
}
