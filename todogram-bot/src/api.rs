//! Minimal Telegram Bot API client.
//!
//! Covers exactly the slice of the Bot API this bot touches: `getUpdates`
//! long polling plus the five outbound calls the dispatcher makes. The
//! [`BotApi`] trait is the seam between dispatcher and transport —
//! production uses [`TelegramClient`], tests use an in-process fake.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors that can occur when talking to the Bot API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level HTTP failure (connection, timeout, decode).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API returned `ok: false`.
    #[error("telegram error: {description}")]
    Telegram {
        /// Human-readable description from the API response.
        description: String,
    },
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One incoming event from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier, used as the polling offset.
    pub update_id: i64,
    /// New incoming message, if this update carries one.
    #[serde(default)]
    pub message: Option<Message>,
    /// Inline keyboard button press, if this update carries one.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// A Telegram message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message identifier, unique within the chat.
    pub message_id: i64,
    /// Sender; absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    /// Chat the message belongs to.
    pub chat: Chat,
    /// Text content, if any.
    #[serde(default)]
    pub text: Option<String>,
}

/// A Telegram user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Opaque numeric user identifier.
    pub id: i64,
}

/// A Telegram chat.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat identifier (equals the user id in private chats).
    pub id: i64,
}

/// An inline keyboard button press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Query identifier, needed to answer the callback.
    pub id: String,
    /// User who pressed the button.
    pub from: User,
    /// Message the button was attached to, if still available.
    #[serde(default)]
    pub message: Option<Message>,
    /// Opaque `callback_data` payload set when the button was created.
    #[serde(default)]
    pub data: Option<String>,
}

/// Inline keyboard attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    /// Button rows.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    /// User-visible label.
    pub text: String,
    /// Payload sent back in a [`CallbackQuery`] when pressed.
    pub callback_data: String,
}

/// Response envelope every Bot API call is wrapped in.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

// ---------------------------------------------------------------------------
// The transport seam
// ---------------------------------------------------------------------------

/// Outbound Bot API calls the dispatcher depends on.
///
/// Implemented by [`TelegramClient`] for production and by recording
/// fakes in the dispatch tests.
pub trait BotApi: Send + Sync {
    /// Sends a plain text message to a chat.
    fn send_message(
        &self,
        chat_id: i64,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Message, ApiError>> + Send;

    /// Sends a text message with an inline keyboard attached.
    fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> impl std::future::Future<Output = Result<Message, ApiError>> + Send;

    /// Replaces the text (and keyboard) of an existing message.
    fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Deletes a message from a chat.
    fn delete_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Answers a callback query, showing `text` as a toast to the user.
    fn answer_callback(
        &self,
        callback_id: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}

// ---------------------------------------------------------------------------
// reqwest-backed client
// ---------------------------------------------------------------------------

/// HTTP client for the Bot API.
///
/// Cheap to clone (`reqwest::Client` is an `Arc` internally).
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    /// Method URL prefix: `{api_url}/bot{token}`.
    base: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    /// Creates a client for the given API base URL and bot token.
    ///
    /// The HTTP timeout is set above the long-poll timeout so that an
    /// idle `getUpdates` call is not cut off by the client.
    #[must_use]
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(poll_timeout_secs + 10))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base: format!("{}/bot{token}", api_url.trim_end_matches('/')),
            poll_timeout_secs,
        }
    }

    /// Invokes one Bot API method and unwraps the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{method}", self.base);
        let response: ApiResponse<T> = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(ApiError::Telegram {
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// Long-polls for updates past `offset`.
    ///
    /// Blocks (server-side) for up to the configured poll timeout when no
    /// updates are pending.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or an `ok: false` reply.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ApiError> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
            }),
        )
        .await
    }
}

impl BotApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, ApiError> {
        self.call(
            "sendMessage",
            &serde_json::json!({ "chat_id": chat_id, "text": text }),
        )
        .await
    }

    async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<Message, ApiError> {
        self.call(
            "sendMessage",
            &serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "reply_markup": keyboard,
            }),
        )
        .await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let (Some(keyboard), Some(map)) = (keyboard, body.as_object_mut()) {
            map.insert(
                "reply_markup".to_string(),
                serde_json::to_value(keyboard).unwrap_or_default(),
            );
        }
        // editMessageText returns the edited Message; nothing needs it.
        self.call::<serde_json::Value>("editMessageText", &body)
            .await
            .map(|_| ())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), ApiError> {
        self.call::<serde_json::Value>(
            "deleteMessage",
            &serde_json::json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await
        .map(|_| ())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<(), ApiError> {
        self.call::<serde_json::Value>(
            "answerCallbackQuery",
            &serde_json::json!({ "callback_query_id": callback_id, "text": text }),
        )
        .await
        .map(|_| ())
    }
}
