//! Task data model.
//!
//! A [`Task`] is a single to-do item: a per-user sequential id, an
//! immutable description, and a mutable completion flag. Ids are assigned
//! by [`crate::store::TaskStore`] from a monotonic per-user counter and
//! are never reused, so a `TaskId` stays valid as a button payload even
//! after other tasks are deleted.

use serde::{Deserialize, Serialize};

/// Maximum allowed task description length in characters.
pub const MAX_TASK_TEXT_LENGTH: usize = 256;

/// Unique identifier for a task within one user's list.
///
/// Small sequential integers (starting at 1) rather than UUIDs: ids are
/// rendered in chat lines and typed into callback payloads, so they must
/// stay short and human-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Creates a `TaskId` from a raw integer value.
    #[must_use]
    pub const fn from_u64(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single to-do item.
///
/// `text` is set once at creation and never altered; `done` defaults to
/// `false` and flips only via [`crate::store::TaskStore::set_done`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier, unique within the owning user's list for its lifetime.
    pub id: TaskId,
    /// Description, immutable after creation.
    pub text: String,
    /// Completion flag.
    pub done: bool,
}
