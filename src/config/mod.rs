pub mod credentials;
pub mod model;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub use credentials::Credentials;
pub use model::{AppConfig, SinkKind};

pub const ENV_CONFIG: &str = "TWITCHLOG_CONFIG";

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("twitchlog")
        .join("config.toml")
}

/// Load `$TWITCHLOG_CONFIG`, or the default config file. Only the default file
/// may be absent, in which case defaults are used.
pub fn load_config() -> Result<AppConfig> {
    match std::env::var_os(ENV_CONFIG) {
        Some(path) => load_from(Path::new(&path), true),
        None => load_from(&default_config_path(), false),
    }
}

fn load_from(path: &Path, required: bool) -> Result<AppConfig> {
    if !path.exists() {
        if required {
            return Err(Error::Config(format!(
                "{} is set but {} does not exist",
                ENV_CONFIG,
                path.display()
            )));
        }
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read config from {}: {}", path.display(), e))
    })?;
    parse_config(&contents).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)
        .map_err(|e| Error::Config(format!("failed to parse config file: {}", e)))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    let sink = &config.sink;
    if sink.kind == SinkKind::Http && sink.url.as_deref().map_or(true, str::is_empty) {
        return Err(Error::Config("sink.url is required when sink.kind = \"http\"".into()));
    }
    if sink.queue_capacity == 0 {
        return Err(Error::Config("sink.queue_capacity must be at least 1".into()));
    }
    if sink.max_in_flight == 0 {
        return Err(Error::Config("sink.max_in_flight must be at least 1".into()));
    }
    if config.twitch.host.trim().is_empty() {
        return Err(Error::Config("twitch.host must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.twitch.host, "irc.chat.twitch.tv");
        assert_eq!(cfg.twitch.port, 6697);
        assert_eq!(cfg.twitch.greeting, None);
        assert_eq!(cfg.twitch.greeting_delay_ms, 1500);
        assert_eq!(cfg.sink.kind, SinkKind::Jsonl);
        assert_eq!(cfg.sink.queue_capacity, 1024);
        assert_eq!(cfg.sink.max_in_flight, 4);
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn test_full_file() {
        let cfg = parse_config(
            r##"
            [twitch]
            channel = "#Foo"
            greeting = "Hi {login} is here to help!"

            [sink]
            kind = "http"
            url = "https://events.example.com/chat"
            timeout_secs = 3
            max_in_flight = 8

            [log]
            filter = "twitchlog=debug"
            ansi = false
            "##,
        )
        .unwrap();
        assert_eq!(cfg.twitch.channel.as_deref(), Some("#Foo"));
        assert_eq!(cfg.sink.kind, SinkKind::Http);
        assert_eq!(cfg.sink.timeout_secs, 3);
        assert_eq!(cfg.sink.max_in_flight, 8);
        assert_eq!(cfg.sink.queue_capacity, 1024);
        assert!(!cfg.log.ansi);
    }

    #[test]
    fn test_http_sink_requires_url() {
        let err = parse_config("[sink]\nkind = \"http\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("sink.url")));
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        assert!(parse_config("[sink]\nqueue_capacity = 0\n").is_err());
        assert!(parse_config("[sink]\nmax_in_flight = 0\n").is_err());
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = load_from(&tmp.path().join("config.toml"), false).unwrap();
        assert_eq!(cfg.twitch.port, 6697);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_from(&tmp.path().join("nope.toml"), true).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("nope.toml")));
    }

    #[test]
    fn test_parse_errors_name_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[sink]\nkind = \"dynamo\"\n").unwrap();
        let err = load_from(&path, true).unwrap_err();
        let Error::Config(msg) = err else {
            panic!("expected a configuration error");
        };
        assert!(msg.starts_with(&path.display().to_string()));
        assert!(!msg.contains("configuration error"));
    }

    #[test]
    fn test_unknown_sink_kind_is_a_config_error() {
        let err = parse_config("[sink]\nkind = \"dynamo\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
