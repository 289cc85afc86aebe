//! Presenter: task data to user-facing text and button payloads.
//!
//! Pure functions of [`Task`] data with no side effects on the store. The
//! bot crate maps [`TaskButton`] values onto inline keyboard widgets; this
//! module never touches transport types.

use crate::callback::CallbackAction;
use crate::task::Task;

/// Greeting sent in response to `/start`.
pub const GREETING: &str = "Hi! I'm your to-do list manager.\n\
    Use:\n\
    /add - add a task\n\
    /list - show your tasks\n\
    /manage - manage tasks";

/// Prompt sent in response to `/add`.
pub const ADD_PROMPT: &str = "Send me the description of the new task:";

/// Shown when a list or manage view has nothing to display.
pub const EMPTY_LIST: &str = "Your task list is empty.";

/// Header line above the rendered task list.
pub const LIST_HEADER: &str = "📋 Your tasks:";

/// Header sent before the per-task manage messages.
pub const MANAGE_HEADER: &str = "👇 Manage your tasks:";

/// Sent when a submitted description is empty or whitespace-only.
pub const EMPTY_DESCRIPTION_RETRY: &str =
    "The description cannot be empty. Send me the task description:";

/// Sent when a submitted description exceeds the length cap.
pub const DESCRIPTION_TOO_LONG_RETRY: &str =
    "That description is too long (max 256 characters). Try a shorter one:";

/// Callback toast for a successful status change.
pub const STATUS_UPDATED: &str = "Status updated";

/// Callback toast for a successful delete.
pub const TASK_DELETED: &str = "Task deleted";

/// Callback toast when the target task no longer exists.
pub const TASK_NOT_FOUND: &str = "Task not found (perhaps already deleted)";

/// A labeled button the bot renders under a task message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskButton {
    /// User-visible button label.
    pub label: String,
    /// Encoded `callback_data` payload.
    pub callback: String,
}

/// Returns the status icon for a completion flag.
#[must_use]
pub const fn status_icon(done: bool) -> &'static str {
    if done { "✅" } else { "⬜" }
}

/// Renders one task as a `"{id}. {icon} {text}"` line.
#[must_use]
pub fn task_line(task: &Task) -> String {
    format!("{}. {} {}", task.id, status_icon(task.done), task.text)
}

/// Renders a whole task list, or the empty-list message.
#[must_use]
pub fn task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return EMPTY_LIST.to_string();
    }
    let mut text = format!("{LIST_HEADER}\n\n");
    for task in tasks {
        text.push_str(&task_line(task));
        text.push('\n');
    }
    text
}

/// Confirmation message for a freshly added task.
#[must_use]
pub fn task_added(task: &Task) -> String {
    format!("Task \"{}\" added!", task.text)
}

/// Returns the toggle-status and delete buttons for a task.
///
/// The toggle button's label and action depend on the current `done`
/// state, so the keyboard must be rebuilt after every status change.
#[must_use]
pub fn task_buttons(task: &Task) -> Vec<TaskButton> {
    let (toggle_label, toggle_action) = if task.done {
        ("Back to pending", CallbackAction::Undone(task.id))
    } else {
        ("✅ Done", CallbackAction::Done(task.id))
    };
    vec![
        TaskButton {
            label: toggle_label.to_string(),
            callback: toggle_action.encode(),
        },
        TaskButton {
            label: "🗑️ Delete".to_string(),
            callback: CallbackAction::Delete(task.id).encode(),
        },
    ]
}
