//! Credential resolution.
//!
//! Each of login, channel and token is looked up independently: environment
//! first, then the config file, then the secrets file. The secrets file is
//! only read when something is still missing.

use super::model::TwitchConfig;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_OAUTH: &str = "TWITCH_OAUTH";
pub const ENV_LOGIN: &str = "TWITCH_LOGIN";
pub const ENV_CHANNEL: &str = "TWITCH_CHANNEL";
pub const ENV_SECRETS_FILE: &str = "TWITCH_SECRETS_FILE";

const TOKEN_PREFIX: &str = "oauth:";

/// Normalized connection credentials: lowercase login and channel (no `#`),
/// token with its `oauth:` prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub channel: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("channel", &self.channel)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "TWITCH_BOT_TOKEN", default)]
    bot_token: Option<String>,
    #[serde(rename = "TWITCH_BOT_USERNAME", default)]
    bot_username: Option<String>,
    #[serde(rename = "TWITCH_CHANNEL", default)]
    channel: Option<String>,
}

/// Resolve credentials from `env` (a variable lookup, normally
/// `std::env::var`), the `[twitch]` config section and the secrets file.
///
/// Fails with [`Error::Config`] naming every value that is still missing.
pub fn resolve<F>(env: F, twitch: &TwitchConfig) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let mut login = first_present([env(ENV_LOGIN), twitch.login.clone()]).map(normalize_name);
    let mut channel =
        first_present([env(ENV_CHANNEL), twitch.channel.clone()]).and_then(normalize_channel);
    let mut token = first_present([env(ENV_OAUTH), twitch.oauth.clone()]).and_then(normalize_token);

    if login.is_none() || channel.is_none() || token.is_none() {
        let path = env(ENV_SECRETS_FILE)
            .map(PathBuf::from)
            .or_else(|| twitch.secrets_file.clone());
        if let Some(path) = path {
            let secrets = read_secrets(&path);
            if login.is_none() {
                login = first_present([secrets.bot_username, secrets.channel.clone()])
                    .map(normalize_name);
            }
            if channel.is_none() {
                channel = first_present([secrets.channel]).and_then(normalize_channel);
            }
            if token.is_none() {
                token = first_present([secrets.bot_token]).and_then(normalize_token);
            }
        }
    }

    match (login, channel, token) {
        (Some(login), Some(channel), Some(token)) => Ok(Credentials {
            login,
            channel,
            token,
        }),
        (login, channel, token) => {
            let missing: Vec<&str> = [
                (login.is_none(), ENV_LOGIN),
                (channel.is_none(), ENV_CHANNEL),
                (token.is_none(), ENV_OAUTH),
            ]
            .into_iter()
            .filter_map(|(absent, name)| absent.then_some(name))
            .collect();
            Err(Error::Config(format!(
                "missing {}; set them in the environment, the [twitch] config section, or a secrets file",
                missing.join(", ")
            )))
        }
    }
}

/// A missing or unreadable secrets file is not fatal by itself; validation
/// afterwards reports whatever is still absent.
fn read_secrets(path: &Path) -> SecretsFile {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read secrets file");
            return SecretsFile::default();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to parse secrets file");
        SecretsFile::default()
    })
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn normalize_name(raw: String) -> String {
    raw.to_lowercase()
}

fn normalize_channel(raw: String) -> Option<String> {
    let name = raw.trim_start_matches('#').to_lowercase();
    (!name.is_empty()).then_some(name)
}

fn normalize_token(raw: String) -> Option<String> {
    let bare = raw.strip_prefix(TOKEN_PREFIX).unwrap_or(&raw);
    (!bare.is_empty()).then(|| format!("{}{}", TOKEN_PREFIX, bare))
}
