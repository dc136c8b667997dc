//! HTTP API server for the sensor telemetry service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Ingestion** (`POST /api/v1/sensors/ingest`) guarded by the shared
//!   `x-device-key` credential
//! - **Queries** for the latest reading and bounded history
//! - **Server-sent events** (`/api/v1/sensors/stream`) pushing each new
//!   reading to live subscribers
//! - **To-do CRUD** under `/api/v1/todos`, unrelated to sensor data
//! - **Static assets** from the configured public directory for
//!   anything else
//!
//! # Architecture
//!
//! All sensor state lives in one [`SensorHub`](sensorhub_core::SensorHub)
//! owned by [`AppState`]. Handlers never touch globals, so every test
//! builds its own isolated router.

pub mod auth;
pub mod body;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod query;
pub mod router;
pub mod server;
pub mod state;
pub mod stream;
pub mod todos;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, bind, serve, start_server};
pub use state::AppState;
