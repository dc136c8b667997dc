//! In-memory to-do list.
//!
//! Unrelated to sensor data; it shares only the process and the HTTP
//! router with the telemetry API.
//!
//! - [`store`] -- [`TodoStore`], the list itself
//! - [`input`] -- Validation of create/update bodies and query filters

pub mod input;
pub mod store;

pub use input::{NewTodo, TodoPatch, parse_completed_filter, parse_todo_id};
pub use store::TodoStore;

/// Errors produced by the to-do list.
///
/// The `Display` text is the message returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    /// The `completed` query parameter was neither `true` nor `false`.
    #[error("completed query parametresi sadece true veya false olabilir")]
    InvalidCompletedFilter,

    /// A create body had a missing, non-string, or blank title.
    #[error("title alani zorunlu ve string olmalidir")]
    MissingTitle,

    /// An update body had a non-string or blank title.
    #[error("title alani string ve bos olmamalidir")]
    InvalidTitle,

    /// `completed` in a body was not a boolean.
    #[error("completed alani boolean olmalidir")]
    InvalidCompleted,

    /// No item has the requested identifier.
    #[error("Kayit bulunamadi")]
    NotFound,
}
