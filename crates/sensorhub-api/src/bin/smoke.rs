//! End-to-end smoke check for the sensor API.
//!
//! Starts the server in-process (or targets `TEST_API_BASE_URL` when
//! set), then checks health, ingests one reading with the configured
//! device key, and reads it back through `latest`. Exits non-zero on the
//! first failing step.
//!
//! Environment:
//! - `TEST_API_BASE_URL` -- remote server to test instead of a local one
//! - `TEST_DEVICE_ID` -- device to ingest for (default `esp32-test-1`)
//! - plus everything `ServiceConfig::from_env` reads

use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use sensorhub_api::{AppState, bind, logging, serve};
use sensorhub_core::ServiceConfig;
use sensorhub_types::time::to_iso_millis;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ServiceConfig::from_env()?;
    let device_id = std::env::var("TEST_DEVICE_ID").unwrap_or_else(|_| String::from("esp32-test-1"));

    let (base_url, local) = match std::env::var("TEST_API_BASE_URL") {
        Ok(url) => (url.trim_end_matches('/').to_owned(), None),
        Err(_) => {
            let listener = bind(&config).await?;
            let port = listener.local_addr()?.port();
            let (stop_tx, stop_rx) = oneshot::channel::<()>();
            let state = Arc::new(AppState::new(&config));
            let handle = tokio::spawn(serve(listener, state, async move {
                let _ = stop_rx.await;
            }));
            (format!("http://127.0.0.1:{port}"), Some((stop_tx, handle)))
        }
    };

    let outcome = run(&base_url, &config.device_api_key, &device_id).await;

    if let Some((stop_tx, handle)) = local {
        let _ = stop_tx.send(());
        handle.await.context("local server task failed")??;
    }

    outcome
}

async fn run(base_url: &str, device_key: &str, device_id: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();

    let health = client.get(format!("{base_url}/health")).send().await?;
    if !health.status().is_success() {
        bail!("health check failed: {}", health.status());
    }

    let payload = json!({
        "deviceId": device_id,
        "temperature": 24.6,
        "humidity": 51.2,
        "soundLevel": 30.4,
        "battery": 87,
        "timestamp": to_iso_millis(&Utc::now()),
    });
    let ingest = client
        .post(format!("{base_url}/api/v1/sensors/ingest"))
        .header("x-device-key", device_key)
        .json(&payload)
        .send()
        .await?;
    let ingest_status = ingest.status();
    let ingest_body: Value = ingest.json().await.unwrap_or(Value::Null);
    if ingest_status != reqwest::StatusCode::CREATED {
        bail!("ingest failed ({ingest_status}): {ingest_body}");
    }

    let latest = client
        .get(format!("{base_url}/api/v1/sensors/latest"))
        .query(&[("deviceId", device_id)])
        .send()
        .await?;
    if !latest.status().is_success() {
        bail!("latest failed: {}", latest.status());
    }
    let latest_body: Value = latest.json().await?;

    info!(%base_url, ingest = %ingest_body, latest = %latest_body, "smoke check passed");
    Ok(())
}
