//! Todogram — Telegram to-do list manager bot.
//!
//! Long-polls the Bot API for updates and dispatches them to the task
//! handlers. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/todogram/config.toml`).
//!
//! ```bash
//! # Token from the environment
//! TODOGRAM_TOKEN=123:abc cargo run --bin todogram-bot
//!
//! # Or on the command line, against a local Bot API server
//! cargo run --bin todogram-bot -- --token 123:abc --api-url http://127.0.0.1:8081
//! ```

use std::time::Duration;

use clap::Parser;
use todogram_bot::api::TelegramClient;
use todogram_bot::config::{BotCliArgs, BotConfig};
use todogram_bot::dispatcher::Dispatcher;

/// Pause before retrying after a failed `getUpdates` call.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() {
    let cli = BotCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match BotConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(api_url = %config.api_url, "starting todogram bot");

    let client = TelegramClient::new(&config.api_url, &config.token, config.poll_timeout_secs);
    let dispatcher = Dispatcher::new(client.clone());

    run_polling(&client, &dispatcher).await;
}

/// Long-polling loop: fetch updates, dispatch them sequentially, confirm
/// the offset. Sequential dispatch keeps same-user operations in arrival
/// order.
async fn run_polling(client: &TelegramClient, dispatcher: &Dispatcher<TelegramClient>) {
    let mut offset: i64 = 0;
    loop {
        match client.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    dispatcher.handle_update(update).await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, retrying");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}
