//! TLS transport to the chat server.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

pub type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

/// Open a TCP connection to `host:port` and complete the TLS handshake,
/// verifying the server against the bundled web PKI roots.
pub async fn connect(host: &str, port: u16) -> Result<TlsStream> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| Error::Tls(format!("invalid server name {}: {}", host, e)))?;

    let tcp = TcpStream::connect((host, port)).await?;
    tcp.set_nodelay(true)?;

    let connector = TlsConnector::from(Arc::new(tls_config()));
    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(|e| Error::Tls(format!("handshake with {}:{} failed: {}", host, port, e)))?;
    tracing::info!(%host, port, "tls connected");
    Ok(stream)
}

fn tls_config() -> rustls::ClientConfig {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}
