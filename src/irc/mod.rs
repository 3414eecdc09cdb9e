//! IRC protocol layer: framing, parsing, outbound commands, and the session
//! that ties them to a TLS connection.

pub mod commands;
pub mod connection;
pub mod framer;
pub mod message;
pub mod session;
