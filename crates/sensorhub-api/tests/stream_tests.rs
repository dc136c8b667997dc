//! Integration tests for the server-sent event stream.
//!
//! The stream response body is read chunk by chunk while readings are
//! ingested through the same router, all in-process.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use sensorhub_api::build_router;
use sensorhub_api::state::AppState;
use sensorhub_core::ServiceConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

/// One parsed event: its name and JSON payload.
type SseEvent = (String, Value);

fn test_router(config: &ServiceConfig) -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::new(config));
    let router = build_router(Arc::clone(&state));
    (state, router)
}

async fn open_stream(router: &Router, path: &str) -> BodyDataStream {
    let response = router
        .clone()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/event-stream"));
    response.into_body().into_data_stream()
}

async fn ingest(router: &Router, body: &Value) {
    let request = Request::post("/api/v1/sensors/ingest")
        .header("x-device-key", "esp32-demo-key")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Read from the stream until `buffer` contains `needle`.
async fn read_until(stream: &mut BodyDataStream, buffer: &mut String, needle: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !buffer.contains(needle) {
            let chunk = stream.next().await.unwrap().unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    })
    .await
    .unwrap();
}

/// Parse events out of the raw stream text, skipping comments and
/// anything incomplete.
fn parse_events(text: &str) -> Vec<SseEvent> {
    text.split("\n\n")
        .filter_map(|block| {
            let mut name = None;
            let mut data = None;
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    name = Some(value.trim().to_owned());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data = serde_json::from_str(value.trim()).ok();
                }
            }
            Some((name?, data?))
        })
        .collect()
}

fn sensor_ids(events: &[SseEvent]) -> Vec<u64> {
    events
        .iter()
        .filter(|(name, _)| name == "sensor")
        .map(|(_, data)| data["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_stream_starts_with_ready_event() {
    let (_, router) = test_router(&ServiceConfig::default());
    let mut stream = open_stream(&router, "/api/v1/sensors/stream").await;
    let mut buffer = String::new();
    read_until(&mut stream, &mut buffer, "connected").await;

    let events = parse_events(&buffer);
    assert_eq!(events.first().unwrap(), &(String::from("ready"), json!({"status": "connected"})));
}

#[tokio::test]
async fn test_stream_replays_latest_matching_reading_only() {
    let (_, router) = test_router(&ServiceConfig::default());
    ingest(&router, &json!({"deviceId": "d1", "temperature": 1})).await;
    ingest(&router, &json!({"deviceId": "d1", "temperature": 2})).await;
    ingest(&router, &json!({"deviceId": "d2", "temperature": 3})).await;

    let mut stream = open_stream(&router, "/api/v1/sensors/stream?deviceId=d1").await;
    let mut buffer = String::new();
    read_until(&mut stream, &mut buffer, "\"id\":2").await;

    let events = parse_events(&buffer);
    assert_eq!(events.first().unwrap().0, "ready");
    assert_eq!(sensor_ids(&events), vec![2]);
}

#[tokio::test]
async fn test_stream_delivers_matching_readings_in_order() {
    let (_, router) = test_router(&ServiceConfig::default());
    let mut stream = open_stream(&router, "/api/v1/sensors/stream?deviceId=d1").await;
    let mut buffer = String::new();
    read_until(&mut stream, &mut buffer, "connected").await;

    ingest(&router, &json!({"deviceId": "d1", "temperature": 1})).await;
    ingest(&router, &json!({"deviceId": "d2", "temperature": 2})).await;
    ingest(&router, &json!({"deviceId": "d1", "temperature": 3})).await;
    read_until(&mut stream, &mut buffer, "\"id\":3").await;

    let events = parse_events(&buffer);
    assert_eq!(sensor_ids(&events), vec![1, 3]);
    assert!(events.iter().all(|(_, data)| data["deviceId"] != "d2"));

    let sensor = events.iter().find(|(name, _)| name == "sensor").unwrap();
    assert_eq!(sensor.1["deviceId"], "d1");
    assert_eq!(sensor.1["temperature"], 1.0);
}

#[tokio::test]
async fn test_unfiltered_stream_gets_every_device() {
    let (_, router) = test_router(&ServiceConfig::default());
    let mut stream = open_stream(&router, "/api/v1/sensors/stream").await;
    let mut buffer = String::new();
    read_until(&mut stream, &mut buffer, "connected").await;

    ingest(&router, &json!({"deviceId": "a", "humidity": 1})).await;
    ingest(&router, &json!({"deviceId": "b", "humidity": 2})).await;
    read_until(&mut stream, &mut buffer, "\"id\":2").await;

    assert_eq!(sensor_ids(&parse_events(&buffer)), vec![1, 2]);
}

#[tokio::test]
async fn test_stream_sends_keepalive_comments() {
    let config = ServiceConfig {
        stream_keepalive: Duration::from_millis(50),
        ..ServiceConfig::default()
    };
    let (_, router) = test_router(&config);
    let mut stream = open_stream(&router, "/api/v1/sensors/stream").await;
    let mut buffer = String::new();
    read_until(&mut stream, &mut buffer, "ping").await;

    assert!(sensor_ids(&parse_events(&buffer)).is_empty());
}

#[tokio::test]
async fn test_disconnect_unregisters_subscriber() {
    let (state, router) = test_router(&ServiceConfig::default());
    let mut stream = open_stream(&router, "/api/v1/sensors/stream").await;
    let mut buffer = String::new();
    read_until(&mut stream, &mut buffer, "connected").await;
    assert_eq!(state.hub.subscriber_count(), 1);

    drop(stream);
    assert_eq!(state.hub.subscriber_count(), 0);

    ingest(&router, &json!({"deviceId": "a", "humidity": 1})).await;
    assert_eq!(state.hub.subscriber_count(), 0);
}
