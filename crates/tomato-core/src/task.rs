//! The to-do list shown next to the timer.
//!
//! Tasks are identified by their creation time in epoch milliseconds. Two
//! tasks created in the same millisecond get consecutive ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Ordered task list, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Add a task with trimmed `text`. Empty text is rejected.
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Result<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }
        let mut id = now.timestamp_millis();
        if let Some(max) = self.tasks.iter().map(|t| t.id).max() {
            if id <= max {
                id = max + 1;
            }
        }
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
            created_at: now,
        });
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Flip the completed flag. Returns the new value.
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::TaskNotFound(id))?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn remove(&mut self, id: i64) -> Result<Task> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(CoreError::TaskNotFound(id))?;
        Ok(self.tasks.remove(pos))
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }
}
