//! Outbound command builders.
//!
//! Every builder returns an [`OutboundLine`] that already carries its `\r\n`
//! terminator, so the session can write it verbatim.

use crate::config::Credentials;
use std::fmt;

const CAPABILITIES: &str = "twitch.tv/tags twitch.tv/commands twitch.tv/membership";

/// A single CRLF-terminated line bound for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundLine(String);

impl OutboundLine {
    fn new(body: impl AsRef<str>) -> Self {
        // Strip stray line breaks so one builder can never emit two lines.
        let body: String = body
            .as_ref()
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        Self(format!("{}\r\n", body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for OutboundLine {
    /// Shows the line without its terminator, for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().trim_end_matches("\r\n"))
    }
}

/// Keepalive reply: `PONG <payload>`, echoing the PING payload unchanged.
pub fn pong(payload: &str) -> OutboundLine {
    OutboundLine::new(format!("PONG {}", payload))
}

/// Registration sequence, in the order the server expects it.
pub fn handshake(creds: &Credentials) -> [OutboundLine; 4] {
    [
        OutboundLine::new(format!("PASS {}", creds.token)),
        OutboundLine::new(format!("NICK {}", creds.login)),
        OutboundLine::new(format!("JOIN #{}", creds.channel)),
        OutboundLine::new(format!("CAP REQ :{}", CAPABILITIES)),
    ]
}

pub fn privmsg(channel: &str, text: &str) -> OutboundLine {
    OutboundLine::new(format!("PRIVMSG #{} :{}", channel, text))
}
