//! Per-user conversational state.
//!
//! The only multi-step flow in the bot is `/add`: after the prompt, the
//! next free-text message from that user is a task description rather
//! than a command. [`SessionStore`] remembers which users are in that
//! state. Owned by the dispatcher; the task store knows nothing about it.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Conversational state for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    /// No flow in progress; free text is ignored.
    #[default]
    Idle,
    /// `/add` was issued; the next message is the task description.
    AwaitingDescription,
}

/// Process-wide map of user id to conversational state.
///
/// Users absent from the map are [`ChatState::Idle`].
#[derive(Default)]
pub struct SessionStore {
    states: Mutex<HashMap<i64, ChatState>>,
}

impl SessionStore {
    /// Creates a new, empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's current state.
    #[must_use]
    pub fn get(&self, user_id: i64) -> ChatState {
        self.states.lock().get(&user_id).copied().unwrap_or_default()
    }

    /// Sets the user's state.
    pub fn set(&self, user_id: i64, state: ChatState) {
        self.states.lock().insert(user_id, state);
    }

    /// Resets the user's state to [`ChatState::Idle`].
    pub fn clear(&self, user_id: i64) {
        self.states.lock().remove(&user_id);
    }
}
