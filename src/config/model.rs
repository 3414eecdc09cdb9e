//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default so an empty or missing file is valid; only the
//! credentials have to come from somewhere.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub twitch: TwitchConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Chat server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bot login. `TWITCH_LOGIN` takes precedence.
    #[serde(default)]
    pub login: Option<String>,
    /// Channel to record, with or without the leading `#`. `TWITCH_CHANNEL`
    /// takes precedence.
    #[serde(default)]
    pub channel: Option<String>,
    /// OAuth token, with or without the `oauth:` prefix. `TWITCH_OAUTH` takes
    /// precedence.
    #[serde(default)]
    pub oauth: Option<String>,
    /// JSON file with `TWITCH_BOT_TOKEN`/`TWITCH_BOT_USERNAME`/`TWITCH_CHANNEL`
    /// consulted for anything still missing. `TWITCH_SECRETS_FILE` takes
    /// precedence.
    #[serde(default)]
    pub secrets_file: Option<PathBuf>,
    /// Sent once to the channel after joining. `{login}` expands to the bot
    /// login.
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default = "default_greeting_delay_ms")]
    pub greeting_delay_ms: u64,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            login: None,
            channel: None,
            oauth: None,
            secrets_file: None,
            greeting: None,
            greeting_delay_ms: default_greeting_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Daily JSON-lines files per channel.
    #[default]
    Jsonl,
    /// POST each event to `url`.
    Http,
    /// Emit events through the log only.
    Log,
}

/// Event sink selection and submission limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,
    #[serde(default = "default_sink_dir")]
    pub dir: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            dir: default_sink_dir(),
            url: None,
            timeout_secs: default_timeout_secs(),
            queue_capacity: default_queue_capacity(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Diagnostic log settings. `RUST_LOG` overrides `filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_true")]
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            ansi: true,
        }
    }
}

fn default_host() -> String {
    "irc.chat.twitch.tv".to_string()
}
fn default_port() -> u16 {
    6697
}
fn default_greeting_delay_ms() -> u64 {
    1500
}
fn default_sink_dir() -> String {
    "~/.local/share/twitchlog/events".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_max_in_flight() -> usize {
    4
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
