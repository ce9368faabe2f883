use super::{with_total_timeout, Exchange, Exchanging, Transport, TransportConfig};
use crate::base::neterror::NetError;
use crate::dns::Resolve;
use crate::http::requestbuilder::PreparedRequest;
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use bytes::{BufMut, Bytes, BytesMut};
use http::header::{HeaderValue, COOKIE, TRANSFER_ENCODING};
use http::response::Parts;
use http::Request;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::sync::Arc;

/// Sends requests through hyper's HTTP/1.1 client connection.
///
/// hyper handles framing, so the response comes back de-chunked; it is
/// re-serialized without `Transfer-Encoding` for the shared response parser.
pub struct HyperTransport {
    connector: ConnectJob,
    config: TransportConfig,
}

impl HyperTransport {
    pub fn new(config: TransportConfig, resolver: Arc<dyn Resolve>) -> Self {
        Self {
            connector: ConnectJob::new(
                resolver,
                config.connect_timeout,
                TlsConfig::new(config.verify_peer),
            ),
            config,
        }
    }

    fn build_request(request: &PreparedRequest) -> Result<Request<Full<Bytes>>, NetError> {
        let mut headers = request.headers().to_header_map()?;
        if let Some(cookie) = request.cookie() {
            let value = HeaderValue::from_str(cookie).map_err(|_| NetError::InvalidHeader)?;
            headers.insert(COOKIE, value);
        }

        let mut req = Request::builder()
            .method(request.method().to_http())
            .uri(request.url().request_target())
            .body(Full::new(request.body().clone()))
            .map_err(|_| NetError::InvalidUrl)?;
        *req.headers_mut() = headers;
        Ok(req)
    }

    async fn run(&self, request: &PreparedRequest, want_response: bool) -> Result<Exchange, NetError> {
        let url = request.url();
        let req = Self::build_request(request)?;

        let socket = self.connector.connect(url).await?;
        let (mut sender, conn) = http1::handshake(TokioIo::new(socket))
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "HTTP/1.1 handshake failed");
                NetError::ConnectionFailed
            })?;

        // Drive the connection; it ends when the server closes.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection ended with error");
            }
        });

        tracing::debug!(url = %url.absolute_url(), method = %request.method(), "sending via hyper");

        let exchange = async {
            let resp = sender.send_request(req).await.map_err(map_hyper_error)?;
            if !want_response {
                return Ok(Exchange::Sent);
            }

            let (parts, body) = resp.into_parts();
            let body = body.collect().await.map_err(map_hyper_error)?.to_bytes();
            tracing::debug!(status = parts.status.as_u16(), bytes = body.len(), "response received");
            Ok(Exchange::Response(serialize_response(&parts, &body)))
        };

        let limit = if want_response {
            self.config.total_timeout
        } else {
            None
        };
        with_total_timeout(limit, exchange).await
    }
}

impl Transport for HyperTransport {
    fn exchange<'a>(&'a self, request: &'a PreparedRequest, want_response: bool) -> Exchanging<'a> {
        Box::pin(self.run(request, want_response))
    }
}

fn map_hyper_error(e: hyper::Error) -> NetError {
    tracing::debug!(error = %e, "hyper request failed");
    if e.is_parse() {
        NetError::InvalidHttpResponse
    } else if e.is_incomplete_message() || e.is_closed() {
        NetError::ConnectionClosed
    } else if e.is_timeout() {
        NetError::TimedOut
    } else {
        NetError::ConnectionFailed
    }
}

/// Raw HTTP/1.1 form of a response hyper has already de-framed.
fn serialize_response(parts: &Parts, body: &Bytes) -> Bytes {
    let mut out = BytesMut::with_capacity(256 + body.len());
    out.put_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            parts.status.as_u16(),
            parts.status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );
    for (name, value) in parts.headers.iter() {
        if name == TRANSFER_ENCODING {
            continue;
        }
        out.put_slice(name.as_str().as_bytes());
        out.put_slice(b": ");
        out.put_slice(value.as_bytes());
        out.put_slice(b"\r\n");
    }
    out.put_slice(b"\r\n");
    out.put_slice(body);
    out.freeze()
}
