//! To-do CRUD handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/v1/todos` | List, optional `completed=true\|false` |
//! | `POST` | `/api/v1/todos` | Create |
//! | `GET` | `/api/v1/todos/{id}` | Fetch one |
//! | `PUT` | `/api/v1/todos/{id}` | Partial update |
//! | `DELETE` | `/api/v1/todos/{id}` | Remove |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sensorhub_todos::{NewTodo, TodoError, TodoPatch, parse_todo_id};
use sensorhub_types::TodoId;

use crate::body::JsonBody;
use crate::error::ApiError;
use crate::query::QueryParams;
use crate::state::AppState;

/// List items.
pub async fn list(
    State(state): State<Arc<AppState>>,
    params: QueryParams,
) -> Result<impl IntoResponse, ApiError> {
    let completed = params.completed_filter()?;
    Ok(Json(state.todos.read().await.list(completed)))
}

/// Fetch one item.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(&raw_id)?;
    let todos = state.todos.read().await;
    Ok(Json(todos.get(id)?.clone()))
}

/// Create an item. Responds `201`.
pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let new = NewTodo::from_json(&body)?;
    let todo = state.todos.write().await.create(new);
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Update an item in place.
///
/// A missing item is reported before the body is validated.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(&raw_id)?;
    let mut todos = state.todos.write().await;
    todos.get(id)?;
    let patch = TodoPatch::from_json(&body)?;
    Ok(Json(todos.update(id, patch)?))
}

/// Delete an item. Responds `204`.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(&raw_id)?;
    state.todos.write().await.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn path_id(raw: &str) -> Result<TodoId, ApiError> {
    parse_todo_id(raw).ok_or_else(|| TodoError::NotFound.into())
}
