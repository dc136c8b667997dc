//! Shared type definitions for the sensor telemetry service.
//!
//! Every type that crosses the HTTP boundary lives here so the store,
//! the broadcaster, and the API layer agree on one JSON shape.
//!
//! # Modules
//!
//! - [`ids`] -- Sequential integer identifiers and the UUID-backed subscriber ID
//! - [`reading`] -- Sensor readings and the recognized metric set
//! - [`todo`] -- To-do list items
//! - [`time`] -- Millisecond ISO-8601 timestamp serialization

pub mod ids;
pub mod reading;
pub mod time;
pub mod todo;

// Re-export all public types at crate root for convenience.
pub use ids::{ReadingId, SubscriberId, TodoId};
pub use reading::{Metric, SensorReading};
pub use todo::Todo;
