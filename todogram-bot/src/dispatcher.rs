//! Update dispatcher: routes inbound Telegram events to handler logic.
//!
//! One [`Dispatcher`] instance owns the task store, the conversational
//! session state, and a handle to the Bot API. Each update is handled as
//! an independent unit of work; store errors are reported back to the
//! user and never escalated.

use std::str::FromStr;

use todogram_core::callback::CallbackAction;
use todogram_core::render;
use todogram_core::store::{StoreError, TaskStore};
use todogram_core::task::Task;

use crate::api::{
    BotApi, CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update,
};
use crate::session::{ChatState, SessionStore};

/// Routes updates to command, description, and callback handlers.
pub struct Dispatcher<A> {
    api: A,
    store: TaskStore<i64>,
    sessions: SessionStore,
}

impl<A: BotApi> Dispatcher<A> {
    /// Creates a dispatcher with an empty task store and idle sessions.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            store: TaskStore::new(),
            sessions: SessionStore::new(),
        }
    }

    /// Returns the underlying task store.
    #[must_use]
    pub const fn store(&self) -> &TaskStore<i64> {
        &self.store
    }

    /// Handles one inbound update.
    ///
    /// Updates carrying neither a message nor a callback query are
    /// ignored (the bot subscribes to more update kinds than it handles).
    pub async fn handle_update(&self, update: Update) {
        if let Some(message) = update.message {
            self.handle_message(&message).await;
        } else if let Some(query) = update.callback_query {
            self.handle_callback(&query).await;
        } else {
            tracing::debug!(update_id = update.update_id, "ignoring unhandled update kind");
        }
    }

    /// Handles an inbound chat message: a command, or the task
    /// description a pending `/add` flow is waiting for.
    async fn handle_message(&self, message: &Message) {
        let Some(user_id) = message.from.as_ref().map(|u| u.id) else {
            tracing::debug!(message_id = message.message_id, "message without sender");
            return;
        };
        let Some(text) = message.text.as_deref() else {
            tracing::debug!(user_id, "non-text message ignored");
            return;
        };
        let chat_id = message.chat.id;

        // Commands win over a pending description, matching the original
        // handler registration order.
        match command_word(text) {
            Some("start") => {
                tracing::info!(user_id, "received /start command");
                self.send(chat_id, render::GREETING).await;
            }
            Some("add") => {
                self.sessions.set(user_id, ChatState::AwaitingDescription);
                self.send(chat_id, render::ADD_PROMPT).await;
            }
            Some("list") => {
                let tasks = self.store.list(&user_id);
                self.send(chat_id, &render::task_list(&tasks)).await;
            }
            Some("manage") => {
                self.handle_manage(user_id, chat_id).await;
            }
            _ if self.sessions.get(user_id) == ChatState::AwaitingDescription => {
                self.handle_description(user_id, chat_id, text).await;
            }
            _ => {
                tracing::debug!(user_id, "unmatched message ignored");
            }
        }
    }

    /// Consumes the free-text description following `/add`.
    ///
    /// On a rejected description the session stays in
    /// `AwaitingDescription` so the user can retry without `/add` again.
    async fn handle_description(&self, user_id: i64, chat_id: i64, text: &str) {
        tracing::info!(user_id, "processing task description");
        match self.store.add(&user_id, text) {
            Ok(task) => {
                self.sessions.clear(user_id);
                self.send(chat_id, &render::task_added(&task)).await;
            }
            Err(StoreError::EmptyText) => {
                self.send(chat_id, render::EMPTY_DESCRIPTION_RETRY).await;
            }
            Err(StoreError::TextTooLong) => {
                self.send(chat_id, render::DESCRIPTION_TOO_LONG_RETRY).await;
            }
            Err(e) => {
                // add() has no other failure modes.
                tracing::error!(user_id, error = %e, "unexpected add failure");
            }
        }
    }

    /// Sends the manage view: a header plus one message per task with
    /// that task's action buttons.
    async fn handle_manage(&self, user_id: i64, chat_id: i64) {
        let tasks = self.store.list(&user_id);
        if tasks.is_empty() {
            self.send(chat_id, render::EMPTY_LIST).await;
            return;
        }

        self.send(chat_id, render::MANAGE_HEADER).await;
        for task in &tasks {
            if let Err(e) = self
                .api
                .send_message_with_keyboard(chat_id, &render::task_line(task), keyboard(task))
                .await
            {
                tracing::warn!(user_id, task_id = %task.id, error = %e, "failed to send task card");
            }
        }
    }

    /// Handles an inline keyboard button press.
    async fn handle_callback(&self, query: &CallbackQuery) {
        let user_id = query.from.id;
        let action = match query.data.as_deref().map(CallbackAction::from_str) {
            Some(Ok(action)) => action,
            Some(Err(e)) => {
                tracing::warn!(user_id, error = %e, "undecodable callback data");
                // Answer with no toast to dismiss the client-side spinner.
                self.answer(&query.id, "").await;
                return;
            }
            None => {
                tracing::warn!(user_id, "callback query without data");
                self.answer(&query.id, "").await;
                return;
            }
        };

        tracing::debug!(user_id, action = %action, "handling callback");
        match action {
            CallbackAction::Done(id) | CallbackAction::Undone(id) => {
                let done = matches!(action, CallbackAction::Done(_));
                match self.store.set_done(&user_id, id, done) {
                    Ok(task) => {
                        if let Some(message) = &query.message
                            && let Err(e) = self
                                .api
                                .edit_message_text(
                                    message.chat.id,
                                    message.message_id,
                                    &render::task_line(&task),
                                    Some(keyboard(&task)),
                                )
                                .await
                        {
                            tracing::warn!(user_id, task_id = %id, error = %e, "failed to edit task card");
                        }
                        self.answer(&query.id, render::STATUS_UPDATED).await;
                    }
                    Err(StoreError::TaskNotFound(_)) => {
                        self.answer(&query.id, render::TASK_NOT_FOUND).await;
                    }
                    Err(e) => {
                        tracing::error!(user_id, error = %e, "unexpected set_done failure");
                    }
                }
            }
            CallbackAction::Delete(id) => match self.store.delete(&user_id, id) {
                Ok(()) => {
                    if let Some(message) = &query.message
                        && let Err(e) = self
                            .api
                            .delete_message(message.chat.id, message.message_id)
                            .await
                    {
                        tracing::warn!(user_id, task_id = %id, error = %e, "failed to delete task card");
                    }
                    self.answer(&query.id, render::TASK_DELETED).await;
                }
                Err(StoreError::TaskNotFound(_)) => {
                    self.answer(&query.id, render::TASK_NOT_FOUND).await;
                }
                Err(e) => {
                    tracing::error!(user_id, error = %e, "unexpected delete failure");
                }
            },
        }
    }

    /// Sends a plain message, logging (not escalating) transport errors.
    async fn send(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.api.send_message(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "failed to send message");
        }
    }

    /// Answers a callback query, logging (not escalating) transport errors.
    async fn answer(&self, callback_id: &str, text: &str) {
        if let Err(e) = self.api.answer_callback(callback_id, text).await {
            tracing::warn!(callback_id, error = %e, "failed to answer callback");
        }
    }
}

/// Builds the one-row action keyboard for a task.
fn keyboard(task: &Task) -> InlineKeyboardMarkup {
    let row = render::task_buttons(task)
        .into_iter()
        .map(|b| InlineKeyboardButton {
            text: b.label,
            callback_data: b.callback,
        })
        .collect();
    InlineKeyboardMarkup {
        inline_keyboard: vec![row],
    }
}

/// Extracts the command word from a message text.
///
/// Returns `Some("list")` for `/list`, `/list@somebot`, or `/list args`;
/// `None` for anything that is not a slash command.
fn command_word(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let command = first.strip_prefix('/')?;
    Some(command.split('@').next().unwrap_or(command))
}
