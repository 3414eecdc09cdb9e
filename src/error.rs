//! Fatal error taxonomy.
//!
//! Everything here ends the process. Sink failures are recoverable and live in
//! [`crate::sink::SinkError`] instead.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required credentials or settings are missing or invalid. Raised before
    /// any connection attempt.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("failed to listen for Ctrl-C: {0}")]
    Signal(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
