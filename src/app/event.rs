use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A normalized chat line, ready for storage. Sinks key it by
/// `(channel, timestamp)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub channel: String,
    /// UTC, ISO-8601 with millisecond precision, e.g. `2024-05-01T12:00:00.123Z`.
    pub timestamp: String,
    pub username: String,
    pub message: String,
}

impl ChatEvent {
    pub fn new(
        channel: impl Into<String>,
        username: impl Into<String>,
        message: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            channel: channel.into(),
            timestamp: format_timestamp(at),
            username: username.into(),
            message: message.into(),
        }
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
