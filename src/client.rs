//! HTTP client with builder pattern.
//!
//! A [`Client`] holds one target URL, the request state built up for it and,
//! optionally, a cookie jar that survives across calls. Each [`Client::send`]
//! opens a fresh connection, writes one request and reads the whole response.
//!
//! # Example
//!
//! ```rust,no_run
//! use cookienet::Client;
//!
//! # async fn run() -> Result<(), cookienet::base::neterror::NetError> {
//! let mut client = Client::builder()
//!     .url("https://www.example.com/")
//!     .cookie_file("cookies.txt")
//!     .build()?;
//!
//! client.add_header("User-Agent", "cookienet/0.1")?;
//! let resp = client.send().await?;
//! println!("{} ({} bytes)", resp.status(), resp.body().len());
//! # Ok(())
//! # }
//! ```

use crate::base::neterror::NetError;
use crate::cookies::cookiejar::CookieJar;
use crate::dns::{resolve_host, GaiResolver, Resolve};
use crate::http::method::Method;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::requestbody::RequestBody;
use crate::http::requestbuilder::{check_custom_header_name, PreparedRequest, RequestBuilder};
use crate::http::response::HttpResponse;
use crate::http::responseparser::{decode_body, split_response, store_response_cookies};
use crate::http::urlparts::UrlParts;
use crate::transport::{transport_for, Exchange, Transport, TransportConfig, TransportKind};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;

/// One-request-at-a-time HTTP/1.1 client with an optional cookie jar.
///
/// Use [`Client::builder()`] to configure and create a client.
pub struct Client {
    transport: Box<dyn Transport>,
    resolver: Arc<dyn Resolve>,
    jar: Option<CookieJar>,
    url: UrlParts,
    method: Method,
    headers: OrderedHeaderMap,
    body: RequestBody,
    response: Option<HttpResponse>,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Point the client at a new URL.
    ///
    /// Custom headers are discarded; only `Host` is kept, derived from `url`.
    pub fn set_url(&mut self, url: &str) -> Result<(), NetError> {
        let parts = UrlParts::validate(url)?;
        self.headers.clear();
        self.headers.insert("Host", &parts.host_header())?;
        self.url = parts;
        Ok(())
    }

    /// Change the target but keep custom headers and the current query string.
    pub fn set_address(&mut self, url: &str) -> Result<(), NetError> {
        let mut parts = UrlParts::validate(url)?;
        parts.set_query(self.url.query());
        self.headers.insert("Host", &parts.host_header())?;
        self.url = parts;
        Ok(())
    }

    /// Replace the query string. It is re-encoded canonically.
    pub fn set_query_string(&mut self, query: &str) {
        self.url.set_query(query);
    }

    pub fn set_port(&mut self, port: u16) -> Result<(), NetError> {
        self.url.set_port(port);
        self.headers.insert("Host", &self.url.host_header())
    }

    /// Set the request method from its name, case-insensitively.
    pub fn set_method(&mut self, method: &str) -> Result<(), NetError> {
        self.method = method.parse()?;
        Ok(())
    }

    /// Add or replace a request header.
    ///
    /// `Content-Length` and `Cookie` are computed by the client and are
    /// rejected with [`NetError::ReservedHeader`].
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        check_custom_header_name(name)?;
        self.headers.insert(name, value)
    }

    /// Merge form fields into the body. Existing keys are overwritten.
    pub fn add_form_data<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body.merge_form(fields);
    }

    /// Merge an `a=1&b=2` string into the form fields.
    pub fn add_form_str(&mut self, encoded: &str) -> Result<(), NetError> {
        self.body.merge_form_str(encoded)
    }

    /// Send `content` verbatim as the body. The caller sets a matching
    /// `Content-Type`.
    pub fn set_body_content(&mut self, content: impl Into<String>) -> Result<(), NetError> {
        self.body.set_raw(content)
    }

    /// Send the request and read the full response.
    ///
    /// `Set-Cookie` values are stored in the jar as soon as the header block
    /// parses, so they survive a body that fails to decode. The jar is then
    /// saved if it has a file. The previous response is cleared before
    /// anything is sent.
    pub async fn send(&mut self) -> Result<&HttpResponse, NetError> {
        self.response = None;
        let request = self.prepare().await?;

        let raw = match self.transport.exchange(&request, true).await? {
            Exchange::Response(raw) => raw,
            Exchange::Sent => return Err(NetError::EmptyResponse),
        };
        let (status, headers, body) = split_response(&raw, self.method)?;

        if let Some(jar) = self.jar.as_mut() {
            let stored = store_response_cookies(&headers, jar, &self.url);
            if stored > 0 {
                tracing::debug!(stored, "cookies updated from response");
            }
            if let Err(e) = jar.save() {
                tracing::warn!(error = %e, "failed to save cookie file");
            }
        }

        let body = decode_body(&headers, body)?;
        tracing::debug!(url = %self.url, status, bytes = body.len(), "response parsed");
        let response = HttpResponse::new(status, headers, body);

        Ok(&*self.response.insert(response))
    }

    /// Send the request without waiting for the response body.
    ///
    /// Returns once the request is out. Nothing is parsed and the jar is left
    /// untouched.
    pub async fn send_without_response(&mut self) -> Result<(), NetError> {
        self.response = None;
        let request = self.prepare().await?;
        self.transport.exchange(&request, false).await?;
        Ok(())
    }

    /// Check that the host resolves and compose the wire request.
    async fn prepare(&mut self) -> Result<PreparedRequest, NetError> {
        resolve_host(self.resolver.as_ref(), self.url.host(), self.url.port()).await?;

        self.headers.insert("Connection", "Close")?;
        let mut headers = self.headers.clone();
        let body = if self.method.sends_body() {
            if let Some(content_type) = self.body.content_type() {
                if !headers.contains("Content-Type") {
                    headers.insert("Content-Type", content_type)?;
                }
            }
            let body = self.body.encode();
            if !body.is_empty() {
                headers.insert("Content-Length", &body.len().to_string())?;
            }
            body
        } else {
            Bytes::new()
        };

        Ok(RequestBuilder::new(self.method, &self.url)
            .headers(&headers)
            .cookies(self.jar.as_ref())
            .body(body)
            .build())
    }

    /// The last response, cleared at the start of every send.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Headers sent with every request, including `Host`.
    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    pub fn jar(&self) -> Option<&CookieJar> {
        self.jar.as_ref()
    }

    pub fn jar_mut(&mut self) -> Option<&mut CookieJar> {
        self.jar.as_mut()
    }

    pub fn url(&self) -> &UrlParts {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    url: Option<String>,
    kind: TransportKind,
    config: Option<TransportConfig>,
    transport: Option<Box<dyn Transport>>,
    resolver: Option<Arc<dyn Resolve>>,
    cookie_store: bool,
    cookie_file: Option<PathBuf>,
}

impl ClientBuilder {
    /// Set the target URL. Required.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Choose a built-in transport. Defaults to [`TransportKind::Socket`].
    pub fn transport(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    /// Override the timeouts and certificate policy of the built-in transport.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `transport` instead of a built-in one.
    pub fn custom_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the DNS resolver. Defaults to [`GaiResolver`].
    pub fn resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Keep cookies in memory across requests.
    pub fn cookie_store(mut self, enable: bool) -> Self {
        self.cookie_store = enable;
        self
    }

    /// Keep cookies and persist them to `path` after every response.
    ///
    /// The file is loaded when the client is built; a missing file is an
    /// empty jar.
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client, NetError> {
        let url = UrlParts::validate(self.url.as_deref().ok_or(NetError::InvalidUrl)?)?;

        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(GaiResolver::new()));
        let kind = self.kind;
        let transport = match self.transport {
            Some(transport) => transport,
            None => transport_for(
                kind,
                self.config.unwrap_or_else(|| TransportConfig::for_kind(kind)),
                resolver.clone(),
            ),
        };

        let jar = match self.cookie_file {
            Some(path) => {
                let mut jar = CookieJar::with_persistence(path.clone());
                match jar.load(&path) {
                    Ok(loaded) => {
                        tracing::debug!(path = %path.display(), loaded, "cookie file loaded");
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "failed to load cookie file");
                    }
                }
                Some(jar)
            }
            None if self.cookie_store => Some(CookieJar::new()),
            None => None,
        };

        let mut headers = OrderedHeaderMap::new();
        headers.insert("Host", &url.host_header())?;

        Ok(Client {
            transport,
            resolver,
            jar,
            url,
            method: Method::Get,
            headers,
            body: RequestBody::Empty,
            response: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::DnsResolverWithOverrides;
    use crate::transport::Exchanging;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Mutex;

    /// Records requests and answers with a canned response.
    struct Scripted {
        reply: Bytes,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for Scripted {
        fn exchange<'a>(&'a self, request: &'a PreparedRequest, want_response: bool) -> Exchanging<'a> {
            self.seen
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(request.as_bytes()).into_owned());
            let reply = self.reply.clone();
            Box::pin(async move {
                if want_response {
                    Ok(Exchange::Response(reply))
                } else {
                    Ok(Exchange::Sent)
                }
            })
        }
    }

    fn client(reply: &'static str) -> (Client, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let resolver = DnsResolverWithOverrides::new(Arc::new(GaiResolver::new()))
            .with_override("shop.example.com", IpAddr::V4(Ipv4Addr::LOCALHOST));
        let client = Client::builder()
            .url("http://shop.example.com/cart/view?b=2&a=1")
            .resolver(Arc::new(resolver))
            .custom_transport(Box::new(Scripted {
                reply: Bytes::from_static(reply.as_bytes()),
                seen: seen.clone(),
            }))
            .cookie_store(true)
            .build()
            .unwrap();
        (client, seen)
    }

    #[test]
    fn test_build_requires_valid_url() {
        assert!(matches!(Client::builder().build(), Err(NetError::InvalidUrl)));
        assert!(matches!(
            Client::builder().url("not a url").build(),
            Err(NetError::InvalidUrl)
        ));
    }

    #[test]
    fn test_host_header_tracks_port() {
        let (mut client, _) = client("");
        assert_eq!(client.headers().get("host"), Some("shop.example.com"));
        client.set_port(8080).unwrap();
        assert_eq!(client.headers().get("host"), Some("shop.example.com:8080"));
    }

    #[test]
    fn test_set_url_resets_headers() {
        let (mut client, _) = client("");
        client.add_header("X-Token", "abc").unwrap();
        client.set_url("http://other.example.com/").unwrap();
        assert_eq!(client.headers().len(), 1);
        assert_eq!(client.url().query(), "");
    }

    #[test]
    fn test_set_address_keeps_headers_and_query() {
        let (mut client, _) = client("");
        client.add_header("X-Token", "abc").unwrap();
        client.set_address("http://other.example.com/list?z=9").unwrap();
        assert_eq!(client.headers().get("x-token"), Some("abc"));
        assert_eq!(client.headers().get("host"), Some("other.example.com"));
        assert_eq!(client.url().path(), "/list");
        assert_eq!(client.url().query(), "b=2&a=1");
    }

    #[test]
    fn test_reserved_headers_rejected() {
        let (mut client, _) = client("");
        assert!(matches!(
            client.add_header("Content-Length", "3"),
            Err(NetError::ReservedHeader(_))
        ));
        assert!(matches!(
            client.add_header("cookie", "a=b"),
            Err(NetError::ReservedHeader(_))
        ));
        assert!(matches!(client.add_header("x", "1"), Err(NetError::InvalidHeader)));
    }

    #[test]
    fn test_set_method() {
        let (mut client, _) = client("");
        client.set_method("post").unwrap();
        assert_eq!(client.method(), Method::Post);
        assert!(matches!(
            client.set_method("PATCH"),
            Err(NetError::MethodNotSupported)
        ));
        assert_eq!(client.method(), Method::Post);
    }

    #[tokio::test]
    async fn test_send_stores_cookies_and_serves_them() {
        let (mut client, seen) = client(
            "HTTP/1.1 200 OK\r\nSet-Cookie: sid=abc; Path=/\r\nContent-Length: 2\r\n\r\nok",
        );

        let resp = client.send().await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text(), "ok");
        assert_eq!(client.jar().unwrap().len(), 1);

        client.send().await.unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("GET /cart/view?b=2&a=1 HTTP/1.1\r\nHost: shop.example.com\r\n"));
        assert!(seen[0].contains("Connection: Close\r\n"));
        assert!(!seen[0].contains("cookie:"));
        assert!(seen[1].contains("cookie: sid=abc\r\n"));
    }

    #[tokio::test]
    async fn test_post_form_body() {
        let (mut client, seen) = client("HTTP/1.1 204 No Content\r\n\r\n");
        client.set_method("POST").unwrap();
        client.add_form_data([("q", "rust lang")]);
        client.add_form_str("page=2").unwrap();
        client.send().await.unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen[0].contains("Content-Type: application/x-www-form-urlencoded\r\n"));
        assert!(seen[0].contains("Content-Length: 18\r\n"));
        assert!(seen[0].ends_with("\r\n\r\nq=rust+lang&page=2"));
    }

    #[tokio::test]
    async fn test_get_ignores_body() {
        let (mut client, seen) = client("HTTP/1.1 200 OK\r\n\r\n");
        client.set_body_content("ignored").unwrap();
        client.send().await.unwrap();

        let seen = seen.lock().unwrap();
        assert!(!seen[0].contains("Content-Length"));
        assert!(seen[0].ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let (mut client, seen) = client("HTTP/1.1 200 OK\r\n\r\n");
        client.set_method("DELETE").unwrap();
        client.add_form_data([("id", "7")]);
        client.send().await.unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen[0].starts_with("DELETE /cart/view"));
        assert!(!seen[0].contains("Content-Type"));
        assert!(seen[0].ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_cookies_kept_when_body_is_corrupt() {
        let (mut client, _) = client(
            "HTTP/1.1 200 OK\r\nSet-Cookie: sid=abc\r\nContent-Encoding: gzip\r\n\r\nnot gzip",
        );
        assert!(matches!(
            client.send().await,
            Err(NetError::ContentDecodingFailed)
        ));
        assert!(client.response().is_none());
        assert_eq!(client.jar().unwrap().get("sid").unwrap().value(), "abc");
    }

    #[tokio::test]
    async fn test_failed_parse_clears_response() {
        let (mut client, _) = client("   ");
        assert!(matches!(client.send().await, Err(NetError::EmptyResponse)));
        assert!(client.response().is_none());
    }

    #[tokio::test]
    async fn test_send_without_response() {
        let (mut client, seen) = client("HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\n\r\n");
        client.send_without_response().await.unwrap();
        assert!(client.response().is_none());
        assert!(client.jar().unwrap().is_empty());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
