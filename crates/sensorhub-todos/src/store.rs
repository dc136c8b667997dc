//! The to-do list store.

use chrono::Utc;
use sensorhub_types::{Todo, TodoId};

use crate::TodoError;
use crate::input::{NewTodo, TodoPatch};

/// Title of the item every fresh store starts with.
pub const SEED_TITLE: &str = "Ilk gorev";

/// Ordered in-memory to-do list with sequential identifiers.
#[derive(Debug, Clone)]
pub struct TodoStore {
    items: Vec<Todo>,
    next_id: TodoId,
}

impl TodoStore {
    /// Create a store holding the single seeded item (id 1).
    pub fn new() -> Self {
        let seed = Todo {
            id: TodoId::FIRST,
            title: String::from(SEED_TITLE),
            completed: false,
            created_at: Utc::now(),
        };
        Self {
            items: vec![seed],
            next_id: TodoId::FIRST.next(),
        }
    }

    /// All items in creation order, optionally filtered by completion.
    pub fn list(&self, completed: Option<bool>) -> Vec<Todo> {
        self.items
            .iter()
            .filter(|todo| completed.is_none_or(|wanted| todo.completed == wanted))
            .cloned()
            .collect()
    }

    /// Look up one item.
    pub fn get(&self, id: TodoId) -> Result<&Todo, TodoError> {
        self.items
            .iter()
            .find(|todo| todo.id == id)
            .ok_or(TodoError::NotFound)
    }

    /// Append a new item and return it.
    pub fn create(&mut self, new: NewTodo) -> Todo {
        let todo = Todo {
            id: self.next_id,
            title: new.title,
            completed: new.completed,
            created_at: Utc::now(),
        };
        self.next_id = self.next_id.next();
        self.items.push(todo.clone());
        todo
    }

    /// Apply a validated patch and return the updated item.
    pub fn update(&mut self, id: TodoId, patch: TodoPatch) -> Result<Todo, TodoError> {
        let todo = self
            .items
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(TodoError::NotFound)?;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(todo.clone())
    }

    /// Remove an item.
    pub fn delete(&mut self, id: TodoId) -> Result<(), TodoError> {
        let before = self.items.len();
        self.items.retain(|todo| todo.id != id);
        if self.items.len() == before {
            return Err(TodoError::NotFound);
        }
        Ok(())
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Restore the seeded state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}
