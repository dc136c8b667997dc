//! To-do list items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TodoId;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Sequential identifier.
    pub id: TodoId,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
    /// Creation time.
    #[serde(with = "crate::time::iso_millis")]
    pub created_at: DateTime<Utc>,
}
