//! Server-sent event stream of live readings.
//!
//! Clients connect to `GET /api/v1/sensors/stream` (optionally with
//! `?deviceId=`) and receive:
//!
//! 1. a `ready` event with `{"status":"connected"}`,
//! 2. a `sensor` event with the current latest matching reading, if any,
//! 3. a `sensor` event for every matching reading ingested afterwards,
//!
//! interleaved with `: ping` comment lines at the configured keep-alive
//! interval. There is no replay beyond the single latest reading.
//!
//! The [`Subscription`] lives inside the response stream. When the
//! client goes away the stream is dropped, which unregisters the
//! subscriber and stops the keep-alive timer with it.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use sensorhub_core::Subscription;
use sensorhub_types::SensorReading;
use tracing::{debug, warn};

use crate::query::QueryParams;
use crate::state::AppState;

/// Payload of the initial `ready` event.
const READY_PAYLOAD: &str = r#"{"status":"connected"}"#;

/// Open a live reading stream.
///
/// # Route
///
/// `GET /api/v1/sensors/stream`
pub async fn sensor_stream(
    State(state): State<Arc<AppState>>,
    params: QueryParams,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let device_id = params.device_filter();
    let (latest, subscription) = state.hub.subscribe(device_id.clone()).await;
    debug!(subscriber_id = %subscription.id(), device_id = ?device_id, "stream opened");

    let ready = Event::default().event("ready").data(READY_PAYLOAD);
    let prelude = stream::iter(std::iter::once(ready).chain(latest.as_ref().and_then(sensor_event)));

    let live = stream::unfold(subscription, |mut subscription: Subscription| async move {
        let reading = subscription.recv().await?;
        Some((reading, subscription))
    })
    .filter_map(|reading| async move { sensor_event(&reading) });

    let events = prelude.chain(live).map(Ok);

    Sse::new(events).keep_alive(KeepAlive::new().interval(state.stream_keepalive).text("ping"))
}

/// Render a reading as a `sensor` event.
///
/// Serialization of a stored reading cannot realistically fail; if it
/// ever does the event is skipped rather than closing the stream.
fn sensor_event(reading: &SensorReading) -> Option<Event> {
    match Event::default().event("sensor").json_data(reading) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(reading_id = %reading.id, "failed to serialize sensor event: {e}");
            None
        }
    }
}
