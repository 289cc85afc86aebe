//! Configuration system for the Todogram bot.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/todogram/config.toml`)
//! 4. Compiled defaults
//!
//! The bot token is the one setting with no default: resolution fails
//! unless it arrives via CLI, environment, or the config file.

use std::path::PathBuf;

/// Errors that can occur when loading bot configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// No bot token was provided by any configuration layer.
    #[error("no bot token configured (set --token, TODOGRAM_TOKEN, or [telegram].token)")]
    MissingToken,
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure for the bot.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BotConfigFile {
    telegram: TelegramFileConfig,
}

/// `[telegram]` section of the bot config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TelegramFileConfig {
    token: Option<String>,
    api_url: Option<String>,
    poll_timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the bot.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Todogram to-do list bot")]
pub struct BotCliArgs {
    /// Telegram bot token (from @BotFather).
    #[arg(short, long, env = "TODOGRAM_TOKEN")]
    pub token: Option<String>,

    /// Path to config file (default: `~/.config/todogram/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the Bot API server.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Long-polling timeout in seconds.
    #[arg(long)]
    pub poll_timeout: Option<u64>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TODOGRAM_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token.
    pub token: String,
    /// Base URL of the Bot API server (no trailing slash).
    pub api_url: String,
    /// Long-polling timeout in seconds.
    pub poll_timeout_secs: u64,
    /// Log level filter string.
    pub log_level: String,
}

/// Default Bot API base URL.
const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default long-polling timeout.
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

impl BotConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and a missing
    /// file is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, or if no layer provides a token.
    pub fn load(cli: &BotCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `BotConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &BotCliArgs, file: &BotConfigFile) -> Result<Self, ConfigError> {
        let token = cli
            .token
            .clone()
            .or_else(|| file.telegram.token.clone())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            token,
            api_url: cli
                .api_url
                .clone()
                .or_else(|| file.telegram.api_url.clone())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            poll_timeout_secs: cli
                .poll_timeout
                .or(file.telegram.poll_timeout_secs)
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            log_level: cli.log_level.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file for the bot.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<BotConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(BotConfigFile::default());
        };
        config_dir.join("todogram").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BotConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
