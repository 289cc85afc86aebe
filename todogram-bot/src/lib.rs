//! Todogram bot library.
//!
//! Binds the task domain in `todogram-core` to the Telegram Bot API:
//! layered configuration, a minimal HTTP client for the handful of Bot
//! API methods the bot needs, per-user conversational state, and the
//! update dispatcher.

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod session;
