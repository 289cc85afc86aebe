//! Task domain model for the Todogram bot.
//!
//! Everything transport-independent lives here: the per-user task store,
//! the callback-data codec, and the presenter that turns task data into
//! user-facing text and button payloads. The bot crate owns the Telegram
//! side and calls into this crate with an opaque user key.

pub mod callback;
pub mod render;
pub mod store;
pub mod task;

pub use callback::{CallbackAction, CallbackError};
pub use store::{StoreError, TaskStore};
pub use task::{MAX_TASK_TEXT_LENGTH, Task, TaskId};
