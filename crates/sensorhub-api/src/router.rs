//! Axum router construction for the sensor API.
//!
//! Assembles all routes (REST + server-sent events + static assets) into
//! a single [`Router`] with CORS, request tracing, a 32 KiB body limit,
//! and panic-to-500 conversion.

use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;
use crate::{auth, handlers, stream, todos};

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 32 * 1024;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness probe
/// - `POST /api/v1/sensors/ingest` -- store a reading (`x-device-key` required)
/// - `GET /api/v1/sensors/latest` -- latest reading
/// - `GET /api/v1/sensors/history`, `GET /api/v1/sensors` -- recent readings
/// - `GET /api/v1/sensors/stream` -- server-sent event stream
/// - `GET|POST /api/v1/todos`, `GET|PUT|DELETE /api/v1/todos/{id}` -- to-do CRUD
///
/// Anything else is looked up in the public directory and, failing
/// that, answered with the JSON 404. A known path with the wrong method
/// gets the same 404.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let assets = ServeDir::new(&state.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(handlers::not_found.into_service());

    let ingest = post(handlers::ingest).route_layer(middleware::from_fn_with_state(
        Arc::clone(&state),
        auth::require_device_key,
    ));

    Router::new()
        .route("/health", get(handlers::health))
        // Sensors
        .route("/api/v1/sensors/ingest", ingest)
        .route("/api/v1/sensors/latest", get(handlers::latest))
        .route("/api/v1/sensors/history", get(handlers::history))
        .route("/api/v1/sensors", get(handlers::history))
        .route("/api/v1/sensors/stream", get(stream::sensor_stream))
        // To-do list
        .route("/api/v1/todos", get(todos::list).post(todos::create))
        .route(
            "/api/v1/todos/{id}",
            get(todos::get).put(todos::update).delete(todos::remove),
        )
        .method_not_allowed_fallback(handlers::not_found)
        .fallback_service(assets)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn a handler panic into the generic 500 body.
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}
