mod app;
mod config;
mod error;
mod irc;
mod logging;
mod sink;

use crate::config::{AppConfig, Credentials};
use crate::error::Error;
use crate::irc::session::{Greeting, Session};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;
    logging::init(&cfg.log);

    if let Err(e) = run(cfg).await {
        tracing::error!(error = %e, "recorder stopped");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cfg: AppConfig) -> Result<(), Error> {
    // Fail before touching the network if anything is missing.
    let creds = config::credentials::resolve(|key| std::env::var(key).ok(), &cfg.twitch)?;
    let sink = sink::build(&cfg.sink)?;

    tracing::info!(
        host = %cfg.twitch.host,
        port = cfg.twitch.port,
        login = %creds.login,
        channel = %creds.channel,
        sink = sink.name(),
        "connecting"
    );

    let (handle, worker) =
        sink::worker::spawn(sink, cfg.sink.queue_capacity, cfg.sink.max_in_flight);
    let result = record(&cfg, creds, handle).await;

    let stats = worker.finish().await;
    tracing::info!(
        stored = stats.stored(),
        failed = stats.failed(),
        dropped = stats.dropped(),
        "sink drained"
    );
    result
}

/// Connect and run the session until the connection ends or Ctrl-C.
async fn record(
    cfg: &AppConfig,
    creds: Credentials,
    handle: sink::worker::SinkHandle,
) -> Result<(), Error> {
    let span = tracing::info_span!("session", channel = %creds.channel);
    let stream = irc::connection::connect(&cfg.twitch.host, cfg.twitch.port)
        .instrument(span.clone())
        .await?;

    let greeting = cfg.twitch.greeting.clone().map(|text| Greeting {
        text,
        delay: Duration::from_millis(cfg.twitch.greeting_delay_ms),
    });
    let session = Session::new(stream, creds, handle).with_greeting(greeting);

    tokio::select! {
        result = session.run().instrument(span) => result,
        signal = tokio::signal::ctrl_c() => interrupted(signal),
    }
}

/// A delivered Ctrl-C is a clean shutdown; failing to listen for it is fatal.
fn interrupted(signal: std::io::Result<()>) -> Result<(), Error> {
    match signal {
        Ok(()) => {
            tracing::info!("interrupted, shutting down");
            Ok(())
        }
        Err(e) => Err(Error::Signal(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_ctrl_c_is_a_clean_shutdown() {
        assert!(interrupted(Ok(())).is_ok());
    }

    #[test]
    fn test_signal_listener_failure_is_fatal() {
        let err = interrupted(Err(io::Error::new(io::ErrorKind::Other, "no handler")))
            .unwrap_err();
        assert!(matches!(err, Error::Signal(_)));
        assert_eq!(err.to_string(), "failed to listen for Ctrl-C: no handler");
    }
}
