//! Request transports.
//!
//! A [`Transport`] takes a fully composed request and returns the raw
//! response bytes. Two implementations ship with the crate:
//!
//! - [`SocketTransport`]: writes the request bytes to a TCP/TLS stream and
//!   reads until the server closes it.
//! - [`HyperTransport`]: hands the request to hyper's HTTP/1.1 client and
//!   re-serializes what it gets back.
//!
//! Both yield the same byte layout, so the response parser does not care which
//! one ran. Tests substitute their own implementation.

mod library;
mod raw;

pub use library::HyperTransport;
pub use raw::SocketTransport;

use crate::base::neterror::NetError;
use crate::dns::Resolve;
use crate::http::requestbuilder::PreparedRequest;
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// What came back from an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// Raw response bytes: status line, headers, blank line, body.
    Response(Bytes),
    /// The request went out and no response was wanted.
    Sent,
}

/// Alias for the `Future` returned by [`Transport::exchange`].
pub type Exchanging<'a> = Pin<Box<dyn Future<Output = Result<Exchange, NetError>> + Send + 'a>>;

/// Sends one request over a fresh connection.
///
/// Implementations open and close their own connection on every call,
/// including on failure.
pub trait Transport: Send + Sync {
    /// Send `request`. With `want_response` the full response is returned,
    /// otherwise [`Exchange::Sent`] once the request is out.
    fn exchange<'a>(&'a self, request: &'a PreparedRequest, want_response: bool) -> Exchanging<'a>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn exchange<'a>(&'a self, request: &'a PreparedRequest, want_response: bool) -> Exchanging<'a> {
        (**self).exchange(request, want_response)
    }
}

/// Which built-in transport a client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    Socket,
    Library,
}

/// Timeouts and certificate policy for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Limit on the whole exchange when a response is wanted. `None` waits
    /// until the server closes the connection.
    pub total_timeout: Option<Duration>,
    pub verify_peer: bool,
}

impl TransportConfig {
    /// Defaults for [`SocketTransport`]: 30 s connect, no total limit,
    /// certificates verified.
    pub fn socket() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            total_timeout: None,
            verify_peer: true,
        }
    }

    /// Defaults for [`HyperTransport`]: 5 s connect, 120 s total,
    /// certificates not verified.
    pub fn library() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            total_timeout: Some(Duration::from_secs(120)),
            verify_peer: false,
        }
    }

    pub fn for_kind(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Socket => Self::socket(),
            TransportKind::Library => Self::library(),
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn total_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.total_timeout = timeout;
        self
    }

    pub fn verify_peer(mut self, verify: bool) -> Self {
        self.verify_peer = verify;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::socket()
    }
}

/// Build the transport for `kind`.
pub fn transport_for(
    kind: TransportKind,
    config: TransportConfig,
    resolver: Arc<dyn Resolve>,
) -> Box<dyn Transport> {
    match kind {
        TransportKind::Socket => Box::new(SocketTransport::new(config, resolver)),
        TransportKind::Library => Box::new(HyperTransport::new(config, resolver)),
    }
}

/// Run `fut` under `limit`, mapping expiry to [`NetError::TimedOut`].
pub(crate) async fn with_total_timeout<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T, NetError>>,
) -> Result<T, NetError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            tracing::debug!(timeout = ?limit, "exchange timed out");
            NetError::TimedOut
        })?,
        None => fut.await,
    }
}
