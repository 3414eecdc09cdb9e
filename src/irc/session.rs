//! One connection's worth of protocol state.
//!
//! A [`Session`] owns the transport and the framer accumulator. It sends the
//! registration handshake, then loops: read a chunk, frame it, parse and
//! dispatch every completed line. PONGs are written inline before the next
//! line is looked at; chat events go to the sink worker without waiting.

use crate::app::action::Action;
use crate::app::handler::handle_message;
use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::irc::commands::{self, OutboundLine};
use crate::irc::framer::LineFramer;
use crate::irc::message::parse;
use crate::sink::worker::SinkHandle;
use chrono::Utc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const READ_BUF_SIZE: usize = 8192;

/// A one-off message posted to the channel shortly after joining.
#[derive(Debug, Clone)]
pub struct Greeting {
    pub text: String,
    pub delay: Duration,
}

pub struct Session<S> {
    stream: S,
    framer: LineFramer,
    creds: Credentials,
    sink: SinkHandle,
    greeting: Option<Greeting>,
}

enum Step {
    Read(usize),
    Greet,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, creds: Credentials, sink: SinkHandle) -> Self {
        Self {
            stream,
            framer: LineFramer::new(),
            creds,
            sink,
            greeting: None,
        }
    }

    pub fn with_greeting(mut self, greeting: Option<Greeting>) -> Self {
        self.greeting = greeting.map(|g| Greeting {
            text: g.text.replace("{login}", &self.creds.login),
            delay: g.delay,
        });
        self
    }

    /// Handshake, then process the stream until it closes or fails. Never
    /// returns `Ok`: the end of the stream is [`Error::ConnectionClosed`].
    pub async fn run(mut self) -> Result<()> {
        self.handshake().await?;

        let mut greeting = self.greeting.take();
        let greet_timer =
            tokio::time::sleep(greeting.as_ref().map_or(Duration::ZERO, |g| g.delay));
        tokio::pin!(greet_timer);

        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            let step = tokio::select! {
                read = self.stream.read(&mut buf) => Step::Read(read?),
                _ = &mut greet_timer, if greeting.is_some() => Step::Greet,
            };

            match step {
                Step::Read(0) => {
                    tracing::error!(pending = self.framer.pending(), "connection closed");
                    return Err(Error::ConnectionClosed);
                }
                Step::Read(n) => self.process_chunk(&buf[..n]).await?,
                Step::Greet => {
                    if let Some(g) = greeting.take() {
                        let line = commands::privmsg(&self.creds.channel, &g.text);
                        self.send(&line).await?;
                        tracing::info!(%line, "greeting sent");
                    }
                }
            }
        }
    }

    async fn handshake(&mut self) -> Result<()> {
        // Not logged line by line: PASS carries the token.
        for line in commands::handshake(&self.creds) {
            self.stream.write_all(line.as_bytes()).await?;
        }
        self.stream.flush().await?;
        tracing::info!(login = %self.creds.login, channel = %self.creds.channel, "handshake sent");
        Ok(())
    }

    async fn process_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        for line in self.framer.feed(chunk) {
            match handle_message(parse(&line), Utc::now()) {
                Some(Action::Reply(reply)) => {
                    self.send(&reply).await?;
                    tracing::debug!(%reply, "keepalive reply sent");
                }
                Some(Action::Submit(event)) => {
                    self.sink.submit(event);
                }
                None => {}
            }
        }
        Ok(())
    }

    async fn send(&mut self, line: &OutboundLine) -> Result<()> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
