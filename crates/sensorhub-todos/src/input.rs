//! Request input parsing for the to-do list.
//!
//! Bodies arrive as loose JSON; a body with any invalid field is
//! rejected whole.

use sensorhub_types::TodoId;
use serde_json::{Map, Value};

use crate::TodoError;

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Initial completion flag (default `false`).
    pub completed: bool,
}

impl NewTodo {
    /// Validate a create body.
    ///
    /// `title` is required; `completed` is optional and defaults to `false`.
    pub fn from_json(body: &Value) -> Result<Self, TodoError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let title = fields
            .get("title")
            .and_then(non_blank)
            .ok_or(TodoError::MissingTitle)?;

        let completed = match fields.get("completed") {
            None => false,
            Some(raw) => raw.as_bool().ok_or(TodoError::InvalidCompleted)?,
        };

        Ok(Self { title, completed })
    }
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    /// Replacement title, if given.
    pub title: Option<String>,
    /// Replacement completion flag, if given.
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Validate an update body. Absent fields are left untouched.
    pub fn from_json(body: &Value) -> Result<Self, TodoError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let title = fields
            .get("title")
            .map(|raw| non_blank(raw).ok_or(TodoError::InvalidTitle))
            .transpose()?;
        let completed = fields
            .get("completed")
            .map(|raw| raw.as_bool().ok_or(TodoError::InvalidCompleted))
            .transpose()?;

        Ok(Self { title, completed })
    }
}

/// Parse the `completed` list filter: absent, `true`, or `false`.
pub fn parse_completed_filter(raw: Option<&str>) -> Result<Option<bool>, TodoError> {
    match raw {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(TodoError::InvalidCompletedFilter),
    }
}

/// Parse a path identifier.
///
/// Accepts any spelling of a non-negative integer (`"3"`, `" 3 "`,
/// `"3.0"`); anything else matches no item.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn parse_todo_id(raw: &str) -> Option<TodoId> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return Some(TodoId(id));
    }
    let number = raw.parse::<f64>().ok()?;
    // Integral and in range, so the cast is exact.
    (number.is_finite() && number >= 0.0 && number.fract() == 0.0 && number <= u64::MAX as f64)
        .then(|| TodoId(number as u64))
}

fn non_blank(raw: &Value) -> Option<String> {
    raw.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_requires_a_title() {
        assert_eq!(NewTodo::from_json(&json!({})), Err(TodoError::MissingTitle));
        assert_eq!(NewTodo::from_json(&json!({"title": "  "})), Err(TodoError::MissingTitle));
        assert_eq!(NewTodo::from_json(&json!({"title": 5})), Err(TodoError::MissingTitle));
    }

    #[test]
    fn create_trims_and_defaults() {
        let todo = NewTodo::from_json(&json!({"title": "  buy milk "})).unwrap();
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.completed);
    }

    #[test]
    fn create_rejects_non_boolean_completed() {
        assert_eq!(
            NewTodo::from_json(&json!({"title": "x", "completed": "yes"})),
            Err(TodoError::InvalidCompleted)
        );
        assert_eq!(
            NewTodo::from_json(&json!({"title": "x", "completed": null})),
            Err(TodoError::InvalidCompleted)
        );
    }

    #[test]
    fn patch_fields_are_optional() {
        assert_eq!(TodoPatch::from_json(&json!({})).unwrap(), TodoPatch::default());
        let patch = TodoPatch::from_json(&json!({"completed": true})).unwrap();
        assert_eq!(patch.completed, Some(true));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn patch_validates_types() {
        assert_eq!(TodoPatch::from_json(&json!({"title": ""})), Err(TodoError::InvalidTitle));
        assert_eq!(
            TodoPatch::from_json(&json!({"title": "ok", "completed": 1})),
            Err(TodoError::InvalidCompleted)
        );
    }

    #[test]
    fn completed_filter() {
        assert_eq!(parse_completed_filter(None), Ok(None));
        assert_eq!(parse_completed_filter(Some("true")), Ok(Some(true)));
        assert_eq!(parse_completed_filter(Some("false")), Ok(Some(false)));
        assert_eq!(
            parse_completed_filter(Some("TRUE")),
            Err(TodoError::InvalidCompletedFilter)
        );
    }

    #[test]
    fn id_spellings() {
        assert_eq!(parse_todo_id("3"), Some(TodoId(3)));
        assert_eq!(parse_todo_id(" 3 "), Some(TodoId(3)));
        assert_eq!(parse_todo_id("3.0"), Some(TodoId(3)));
        assert_eq!(parse_todo_id("3.5"), None);
        assert_eq!(parse_todo_id("-1"), None);
        assert_eq!(parse_todo_id("abc"), None);
    }
}
