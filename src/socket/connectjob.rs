use crate::base::neterror::NetError;
use crate::dns::{resolve_host, Resolve};
use crate::http::urlparts::UrlParts;
use crate::socket::client::SocketType;
use crate::socket::tls::TlsConfig;
use boring::ssl::{SslConnector, SslMethod};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
pub struct ConnectJob {
    resolver: Arc<dyn Resolve>,
    connect_timeout: Duration,
    tls: TlsConfig,
}

impl ConnectJob {
    pub fn new(resolver: Arc<dyn Resolve>, connect_timeout: Duration, tls: TlsConfig) -> Self {
        Self {
            resolver,
            connect_timeout,
            tls,
        }
    }

    /// Open a socket to the URL's host and port, wrapped in TLS for `https`.
    ///
    /// Resolved addresses are tried in order; each attempt gets the full
    /// connect timeout.
    pub async fn connect(&self, url: &UrlParts) -> Result<SocketType, NetError> {
        let host = url.host();
        let port = url.port();

        let addrs = resolve_host(self.resolver.as_ref(), host, port).await?;

        let mut last_err = NetError::ConnectionFailed;
        let mut stream = None;
        for addr in addrs {
            tracing::debug!(host = %host, addr = %addr, "connecting");
            match tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(s)) => {
                    stream = Some(s);
                    break;
                }
                Ok(Err(e)) => {
                    tracing::debug!(addr = %addr, error = %e, "connect attempt failed");
                    last_err = NetError::connection_failed_to(host, port, e);
                }
                Err(_) => {
                    tracing::debug!(addr = %addr, timeout = ?self.connect_timeout, "connect timed out");
                    last_err = NetError::ConnectionTimedOut;
                }
            }
        }
        let stream = stream.ok_or(last_err)?;

        if !url.scheme().is_secure() {
            return Ok(SocketType::Tcp(stream));
        }

        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        self.tls.apply_to_builder(&mut builder)?;
        let connector = builder.build();

        let mut config = connector
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        config.set_use_server_name_indication(TlsConfig::should_set_sni(host));
        config.set_verify_hostname(self.tls.verify_peer);

        let tls_stream = tokio_boring::connect(config, host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(host = %host, error = ?e, "SSL handshake failed");
                NetError::SslProtocolError
            })?;

        Ok(SocketType::Ssl(tls_stream))
    }
}
