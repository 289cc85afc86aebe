//! End-to-end dispatcher tests over a fake Bot API.
//!
//! Drives the dispatcher with synthetic updates the way the polling loop
//! does, and asserts on both the resulting store state and the exact
//! outbound API calls.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use parking_lot::Mutex;
use todogram_bot::api::{
    ApiError, BotApi, CallbackQuery, Chat, InlineKeyboardMarkup, Message, Update, User,
};
use todogram_bot::dispatcher::Dispatcher;
use todogram_core::task::TaskId;

// ---------------------------------------------------------------------------
// Recording fake
// ---------------------------------------------------------------------------

/// One recorded outbound API call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ApiCall {
    Send {
        chat_id: i64,
        text: String,
    },
    SendWithKeyboard {
        chat_id: i64,
        text: String,
        keyboard: InlineKeyboardMarkup,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Delete {
        chat_id: i64,
        message_id: i64,
    },
    Answer {
        callback_id: String,
        text: String,
    },
}

/// In-process `BotApi` that records every call and always succeeds.
#[derive(Clone, Default)]
struct FakeApi {
    calls: Arc<Mutex<Vec<ApiCall>>>,
}

impl FakeApi {
    fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    fn fake_message(chat_id: i64, text: &str) -> Message {
        Message {
            message_id: 1000,
            from: None,
            chat: Chat { id: chat_id },
            text: Some(text.to_string()),
        }
    }
}

impl BotApi for FakeApi {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, ApiError> {
        self.calls.lock().push(ApiCall::Send {
            chat_id,
            text: text.to_string(),
        });
        Ok(Self::fake_message(chat_id, text))
    }

    async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<Message, ApiError> {
        self.calls.lock().push(ApiCall::SendWithKeyboard {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        Ok(Self::fake_message(chat_id, text))
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError> {
        self.calls.lock().push(ApiCall::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), ApiError> {
        self.calls
            .lock()
            .push(ApiCall::Delete { chat_id, message_id });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), ApiError> {
        self.calls.lock().push(ApiCall::Answer {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Update builders
// ---------------------------------------------------------------------------

/// Builds a text-message update from the given user (private chat).
fn text_update(user_id: i64, text: &str) -> Update {
    Update {
        update_id: 1,
        message: Some(Message {
            message_id: 10,
            from: Some(User { id: user_id }),
            chat: Chat { id: user_id },
            text: Some(text.to_string()),
        }),
        callback_query: None,
    }
}

/// Builds a button-press update targeting a task card message.
fn callback_update(user_id: i64, data: &str, card_message_id: i64) -> Update {
    Update {
        update_id: 2,
        message: None,
        callback_query: Some(CallbackQuery {
            id: "cb-1".to_string(),
            from: User { id: user_id },
            message: Some(Message {
                message_id: card_message_id,
                from: None,
                chat: Chat { id: user_id },
                text: None,
            }),
            data: Some(data.to_string()),
        }),
    }
}

/// Dispatcher with a handle to the recording fake.
fn make_dispatcher() -> (Dispatcher<FakeApi>, FakeApi) {
    let api = FakeApi::default();
    (Dispatcher::new(api.clone()), api)
}

/// Runs the `/add` flow to completion for one task.
async fn add_task(dispatcher: &Dispatcher<FakeApi>, user_id: i64, text: &str) {
    dispatcher.handle_update(text_update(user_id, "/add")).await;
    dispatcher.handle_update(text_update(user_id, text)).await;
}

// ---------------------------------------------------------------------------
// Command flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_sends_greeting() {
    let (dispatcher, api) = make_dispatcher();
    dispatcher.handle_update(text_update(42, "/start")).await;

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    let ApiCall::Send { chat_id, text } = &calls[0] else {
        panic!("expected Send, got {:?}", calls[0]);
    };
    assert_eq!(*chat_id, 42);
    assert!(text.contains("/add"));
    assert!(text.contains("/list"));
    assert!(text.contains("/manage"));
}

#[tokio::test]
async fn add_flow_creates_task_and_confirms() {
    let (dispatcher, api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;

    let tasks = dispatcher.store().list(&42);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "Buy milk");
    assert!(!tasks[0].done);

    let calls = api.calls();
    assert_eq!(calls.len(), 2); // prompt + confirmation
    assert_eq!(
        calls[1],
        ApiCall::Send {
            chat_id: 42,
            text: "Task \"Buy milk\" added!".to_string(),
        }
    );
}

#[tokio::test]
async fn free_text_without_pending_add_is_ignored() {
    let (dispatcher, api) = make_dispatcher();
    dispatcher.handle_update(text_update(42, "Buy milk")).await;

    assert!(dispatcher.store().list(&42).is_empty());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn whitespace_description_keeps_the_flow_open() {
    let (dispatcher, api) = make_dispatcher();
    dispatcher.handle_update(text_update(42, "/add")).await;
    dispatcher.handle_update(text_update(42, "   ")).await;

    // Nothing stored, user told to retry.
    assert!(dispatcher.store().list(&42).is_empty());
    let calls = api.calls();
    let ApiCall::Send { text, .. } = &calls[1] else {
        panic!("expected Send, got {:?}", calls[1]);
    };
    assert!(text.contains("cannot be empty"));

    // A retry succeeds without a fresh /add.
    dispatcher.handle_update(text_update(42, "Buy milk")).await;
    assert_eq!(dispatcher.store().list(&42).len(), 1);
}

#[tokio::test]
async fn overlong_description_is_rejected() {
    let (dispatcher, api) = make_dispatcher();
    dispatcher.handle_update(text_update(42, "/add")).await;
    let long = "x".repeat(300);
    dispatcher.handle_update(text_update(42, &long)).await;

    assert!(dispatcher.store().list(&42).is_empty());
    let calls = api.calls();
    let ApiCall::Send { text, .. } = &calls[1] else {
        panic!("expected Send, got {:?}", calls[1]);
    };
    assert!(text.contains("too long"));
}

#[tokio::test]
async fn commands_take_priority_over_pending_description() {
    let (dispatcher, api) = make_dispatcher();
    dispatcher.handle_update(text_update(42, "/add")).await;
    dispatcher.handle_update(text_update(42, "/list")).await;

    // "/list" was routed as a command, not stored as a description.
    assert!(dispatcher.store().list(&42).is_empty());
    let calls = api.calls();
    assert_eq!(
        calls[1],
        ApiCall::Send {
            chat_id: 42,
            text: "Your task list is empty.".to_string(),
        }
    );

    // The flow is still open afterwards.
    dispatcher.handle_update(text_update(42, "Buy milk")).await;
    assert_eq!(dispatcher.store().list(&42).len(), 1);
}

#[tokio::test]
async fn list_renders_tasks_in_order() {
    let (dispatcher, api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;
    add_task(&dispatcher, 42, "Walk dog").await;
    dispatcher.handle_update(text_update(42, "/list")).await;

    let calls = api.calls();
    let ApiCall::Send { text, .. } = calls.last().unwrap() else {
        panic!("expected Send");
    };
    assert_eq!(text, "📋 Your tasks:\n\n1. ⬜ Buy milk\n2. ⬜ Walk dog\n");
}

#[tokio::test]
async fn manage_sends_header_and_one_card_per_task() {
    let (dispatcher, api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;
    add_task(&dispatcher, 42, "Walk dog").await;
    dispatcher.handle_update(text_update(42, "/manage")).await;

    let calls = api.calls();
    let manage_calls = &calls[4..]; // skip the two add flows
    assert_eq!(
        manage_calls[0],
        ApiCall::Send {
            chat_id: 42,
            text: "👇 Manage your tasks:".to_string(),
        }
    );
    let ApiCall::SendWithKeyboard { text, keyboard, .. } = &manage_calls[1] else {
        panic!("expected SendWithKeyboard, got {:?}", manage_calls[1]);
    };
    assert_eq!(text, "1. ⬜ Buy milk");
    assert_eq!(keyboard.inline_keyboard[0][0].callback_data, "done:1");
    assert_eq!(keyboard.inline_keyboard[0][1].callback_data, "delete:1");
    assert!(matches!(
        &manage_calls[2],
        ApiCall::SendWithKeyboard { text, .. } if text == "2. ⬜ Walk dog"
    ));
}

#[tokio::test]
async fn manage_with_no_tasks_reports_empty_list() {
    let (dispatcher, api) = make_dispatcher();
    dispatcher.handle_update(text_update(42, "/manage")).await;

    assert_eq!(
        api.calls(),
        vec![ApiCall::Send {
            chat_id: 42,
            text: "Your task list is empty.".to_string(),
        }]
    );
}

// ---------------------------------------------------------------------------
// Callback flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn done_callback_updates_store_and_card() {
    let (dispatcher, api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;
    dispatcher
        .handle_update(callback_update(42, "done:1", 77))
        .await;

    assert!(dispatcher.store().list(&42)[0].done);

    let calls = api.calls();
    let ApiCall::Edit {
        chat_id,
        message_id,
        text,
        keyboard,
    } = &calls[2]
    else {
        panic!("expected Edit, got {:?}", calls[2]);
    };
    assert_eq!(*chat_id, 42);
    assert_eq!(*message_id, 77);
    assert_eq!(text, "1. ✅ Buy milk");
    // Refreshed keyboard now offers the reverse toggle.
    let keyboard = keyboard.as_ref().unwrap();
    assert_eq!(keyboard.inline_keyboard[0][0].callback_data, "undone:1");

    assert_eq!(
        calls[3],
        ApiCall::Answer {
            callback_id: "cb-1".to_string(),
            text: "Status updated".to_string(),
        }
    );
}

#[tokio::test]
async fn undone_callback_reverts_the_flag() {
    let (dispatcher, _api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;
    dispatcher
        .handle_update(callback_update(42, "done:1", 77))
        .await;
    dispatcher
        .handle_update(callback_update(42, "undone:1", 77))
        .await;

    assert!(!dispatcher.store().list(&42)[0].done);
}

#[tokio::test]
async fn delete_callback_removes_task_and_card() {
    let (dispatcher, api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;
    dispatcher
        .handle_update(callback_update(42, "delete:1", 77))
        .await;

    assert!(dispatcher.store().list(&42).is_empty());

    let calls = api.calls();
    assert_eq!(
        calls[2],
        ApiCall::Delete {
            chat_id: 42,
            message_id: 77,
        }
    );
    assert_eq!(
        calls[3],
        ApiCall::Answer {
            callback_id: "cb-1".to_string(),
            text: "Task deleted".to_string(),
        }
    );
}

#[tokio::test]
async fn callback_on_missing_task_answers_not_found() {
    let (dispatcher, api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;
    dispatcher
        .handle_update(callback_update(42, "delete:9", 77))
        .await;

    // Store untouched, no card deleted, only the toast.
    assert_eq!(dispatcher.store().list(&42).len(), 1);
    let calls = api.calls();
    assert_eq!(
        calls[2],
        ApiCall::Answer {
            callback_id: "cb-1".to_string(),
            text: "Task not found (perhaps already deleted)".to_string(),
        }
    );
    assert_eq!(calls.len(), 3);
}

#[tokio::test]
async fn callback_from_other_user_cannot_touch_the_task() {
    let (dispatcher, api) = make_dispatcher();
    add_task(&dispatcher, 42, "Buy milk").await;

    // User 43 presses a button with user 42's task id.
    dispatcher
        .handle_update(callback_update(43, "delete:1", 77))
        .await;

    assert_eq!(dispatcher.store().list(&42).len(), 1);
    let last = api.calls().pop().unwrap();
    assert!(matches!(
        last,
        ApiCall::Answer { text, .. } if text.contains("not found")
    ));
}

#[tokio::test]
async fn malformed_callback_is_answered_quietly() {
    let (dispatcher, api) = make_dispatcher();
    dispatcher
        .handle_update(callback_update(42, "garbage", 77))
        .await;

    assert_eq!(
        api.calls(),
        vec![ApiCall::Answer {
            callback_id: "cb-1".to_string(),
            text: String::new(),
        }]
    );
}

#[tokio::test]
async fn users_get_independent_lists() {
    let (dispatcher, _api) = make_dispatcher();
    add_task(&dispatcher, 1, "alice task").await;
    add_task(&dispatcher, 2, "bob task").await;

    assert_eq!(dispatcher.store().list(&1)[0].text, "alice task");
    assert_eq!(dispatcher.store().list(&2)[0].text, "bob task");
    assert_eq!(dispatcher.store().list(&1)[0].id, TaskId::from_u64(1));
    assert_eq!(dispatcher.store().list(&2)[0].id, TaskId::from_u64(1));
}
