//! In-memory per-user task store.
//!
//! The [`TaskStore`] owns every user's task list and provides the four
//! mutation/query operations the dispatcher calls into. It is generic
//! over the user key so the core never assumes anything about identity
//! beyond equality and hashing — the bot instantiates it with Telegram's
//! numeric user id.
//!
//! All state is process-lifetime only; a restart loses every list.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::task::{MAX_TASK_TEXT_LENGTH, Task, TaskId};

/// Errors that can occur during task store operations.
///
/// None of these are fatal: the caller reports them to the end user and
/// takes no other action.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// No task with the given id exists for the given user.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// Task description is empty or whitespace-only.
    #[error("task description cannot be empty")]
    EmptyText,
    /// Task description exceeds the maximum length.
    #[error("task description too long (max {MAX_TASK_TEXT_LENGTH} characters)")]
    TextTooLong,
}

/// One user's task list plus its id counter.
///
/// `next_id` is monotonic and never decreases, so ids are unique over the
/// list's whole lifetime — deleting a task never frees its id for reuse.
#[derive(Debug, Default)]
struct UserTasks {
    tasks: Vec<Task>,
    next_id: u64,
}

/// Process-wide collection of per-user task lists.
///
/// Thread-safe via [`RwLock`]: mutations serialize on the write lock (so
/// concurrent same-user events cannot produce lost updates or duplicate
/// ids), and reads observe a consistent snapshot. Every operation is
/// synchronous and in-memory; nothing here blocks on I/O.
pub struct TaskStore<U> {
    lists: RwLock<HashMap<U, UserTasks>>,
}

impl<U> Default for TaskStore<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> TaskStore<U> {
    /// Creates a new, empty task store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
        }
    }
}

impl<U: Eq + Hash + Clone> TaskStore<U> {
    /// Adds a task to the user's list, creating the list if absent.
    ///
    /// The new task gets the next id from the user's counter and starts
    /// not-done. Returns a clone of the created task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyText`] if the description is empty or
    /// whitespace-only, or [`StoreError::TextTooLong`] if it exceeds
    /// [`MAX_TASK_TEXT_LENGTH`] characters.
    pub fn add(&self, user: &U, text: &str) -> Result<Task, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyText);
        }
        if text.chars().count() > MAX_TASK_TEXT_LENGTH {
            return Err(StoreError::TextTooLong);
        }

        let mut lists = self.lists.write();
        let list = lists.entry(user.clone()).or_default();
        list.next_id += 1;
        let task = Task {
            id: TaskId::from_u64(list.next_id),
            text: text.to_string(),
            done: false,
        };
        list.tasks.push(task.clone());
        drop(lists);
        Ok(task)
    }

    /// Returns a snapshot of the user's task list in insertion order.
    ///
    /// Empty vec if the user has no list. Read-only; no side effects.
    #[must_use]
    pub fn list(&self, user: &U) -> Vec<Task> {
        let lists = self.lists.read();
        lists.get(user).map(|l| l.tasks.clone()).unwrap_or_default()
    }

    /// Sets the completion flag of a task, returning the updated task.
    ///
    /// Setting an already-set flag is not an error (the flag just stays).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if no task with that id
    /// exists for that user.
    pub fn set_done(&self, user: &U, id: TaskId, done: bool) -> Result<Task, StoreError> {
        let mut lists = self.lists.write();
        let task = lists
            .get_mut(user)
            .and_then(|l| l.tasks.iter_mut().find(|t| t.id == id))
            .ok_or(StoreError::TaskNotFound(id))?;
        task.done = done;
        Ok(task.clone())
    }

    /// Removes a task from the user's list.
    ///
    /// Subsequent tasks shift position but keep their ids — ids are never
    /// renumbered or reused.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] if no task with that id
    /// exists for that user.
    pub fn delete(&self, user: &U, id: TaskId) -> Result<(), StoreError> {
        let mut lists = self.lists.write();
        let list = lists.get_mut(user).ok_or(StoreError::TaskNotFound(id))?;
        let index = list
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))?;
        list.tasks.remove(index);
        drop(lists);
        Ok(())
    }
}
