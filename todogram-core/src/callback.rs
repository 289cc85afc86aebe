//! Callback-data codec for inline keyboard buttons.
//!
//! Telegram carries a button press back to the bot as an opaque string
//! (`callback_data`). This module defines the typed [`CallbackAction`]
//! variant and the `"<action>:<id>"` wire form (`done:3`, `undone:3`,
//! `delete:3`). The string is decoded exactly once at the transport
//! boundary; everything past the dispatcher works with the typed value.

use std::str::FromStr;

use crate::task::TaskId;

/// Error type for callback-data decode operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CallbackError {
    /// The payload has no `:` separator.
    #[error("malformed callback data (expected \"action:id\"): {0:?}")]
    MissingSeparator(String),
    /// The action tag is not one of `done`, `undone`, `delete`.
    #[error("unknown callback action: {0:?}")]
    UnknownAction(String),
    /// The id part is not a positive integer.
    #[error("invalid task id in callback data: {0:?}")]
    BadTaskId(String),
}

/// A decoded button press targeting one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Mark the task completed.
    Done(TaskId),
    /// Return the task to pending.
    Undone(TaskId),
    /// Remove the task entirely.
    Delete(TaskId),
}

impl CallbackAction {
    /// Returns the id of the task this action targets.
    #[must_use]
    pub const fn task_id(self) -> TaskId {
        match self {
            Self::Done(id) | Self::Undone(id) | Self::Delete(id) => id,
        }
    }

    /// Encodes the action into its `callback_data` wire string.
    #[must_use]
    pub fn encode(self) -> String {
        match self {
            Self::Done(id) => format!("done:{id}"),
            Self::Undone(id) => format!("undone:{id}"),
            Self::Delete(id) => format!("delete:{id}"),
        }
    }
}

impl std::fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for CallbackAction {
    type Err = CallbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, id_str) = s
            .split_once(':')
            .ok_or_else(|| CallbackError::MissingSeparator(s.to_string()))?;
        let id: u64 = id_str
            .parse()
            .map_err(|_| CallbackError::BadTaskId(id_str.to_string()))?;
        let id = TaskId::from_u64(id);
        match action {
            "done" => Ok(Self::Done(id)),
            "undone" => Ok(Self::Undone(id)),
            "delete" => Ok(Self::Delete(id)),
            other => Err(CallbackError::UnknownAction(other.to_string())),
        }
    }
}
