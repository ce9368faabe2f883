use super::{with_total_timeout, Exchange, Exchanging, Transport, TransportConfig};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::dns::Resolve;
use crate::http::requestbuilder::PreparedRequest;
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use bytes::Bytes;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Writes the request bytes to a raw stream and reads until EOF.
///
/// The request carries `Connection: Close`, so the server ends the response
/// by closing the stream.
pub struct SocketTransport {
    connector: ConnectJob,
    total_timeout: Option<std::time::Duration>,
}

impl SocketTransport {
    pub fn new(config: TransportConfig, resolver: Arc<dyn Resolve>) -> Self {
        Self {
            connector: ConnectJob::new(
                resolver,
                config.connect_timeout,
                TlsConfig::new(config.verify_peer),
            ),
            total_timeout: config.total_timeout,
        }
    }

    async fn run(&self, request: &PreparedRequest, want_response: bool) -> Result<Exchange, NetError> {
        let url = request.url();
        let host = url.host();
        let mut socket = self.connector.connect(url).await?;

        socket
            .write_all(request.as_bytes())
            .await
            .target_context(url)?;
        socket.flush().await.target_context(url)?;
        tracing::debug!(host = %host, bytes = request.as_bytes().len(), "request written");

        if !want_response {
            // Closing may race the server's own close; the request is out either way.
            if let Err(e) = socket.shutdown().await {
                tracing::debug!(host = %host, error = %e, "shutdown after send failed");
            }
            return Ok(Exchange::Sent);
        }

        let read = async {
            let mut buf = Vec::new();
            match socket.read_to_end(&mut buf).await {
                Ok(_) => Ok(buf),
                // TLS peers often close without close_notify.
                Err(e) if socket.is_tls() && !buf.is_empty() => {
                    tracing::debug!(host = %host, error = %e, "TLS stream ended uncleanly");
                    Ok(buf)
                }
                Err(e) => Err(NetError::from(e)),
            }
        };
        let buf = with_total_timeout(self.total_timeout, read).await?;
        tracing::debug!(host = %host, bytes = buf.len(), "response read");

        Ok(Exchange::Response(Bytes::from(buf)))
    }
}

impl Transport for SocketTransport {
    fn exchange<'a>(&'a self, request: &'a PreparedRequest, want_response: bool) -> Exchanging<'a> {
        Box::pin(self.run(request, want_response))
    }
}
