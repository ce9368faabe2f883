//! Raw HTTP/1.1 request construction.

use crate::base::neterror::NetError;
use crate::cookies::cookiejar::CookieJar;
use crate::http::method::Method;
use crate::http::orderedheaders::OrderedHeaderMap;
use crate::http::urlparts::UrlParts;
use bytes::{BufMut, Bytes, BytesMut};
use regex::Regex;
use std::sync::LazyLock;

static CUSTOM_HEADER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\-_]{2,}$").expect("header pattern is a valid regex"));

/// Headers the client computes itself.
const RESERVED_HEADERS: [&str; 2] = ["content-length", "cookie"];

/// Check a caller-supplied header name.
///
/// Names must be at least two letters, hyphens or underscores, and must not be
/// `Content-Length` or `Cookie`.
pub fn check_custom_header_name(name: &str) -> Result<(), NetError> {
    if !CUSTOM_HEADER_NAME.is_match(name) {
        return Err(NetError::InvalidHeader);
    }
    if RESERVED_HEADERS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        return Err(NetError::ReservedHeader(name.to_string()));
    }
    Ok(())
}

/// A fully composed request, ready for a transport.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: UrlParts,
    headers: OrderedHeaderMap,
    cookie: Option<String>,
    body: Bytes,
    raw: Bytes,
}

impl PreparedRequest {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &UrlParts {
        &self.url
    }

    /// Caller and client headers, without the cookie header.
    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    /// Cookie header value served by the jar, if any cookie applies.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Request line, headers, blank line and body as sent on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

/// Builds the wire form of a request.
pub struct RequestBuilder<'a> {
    method: Method,
    url: &'a UrlParts,
    headers: Option<&'a OrderedHeaderMap>,
    jar: Option<&'a CookieJar>,
    body: Bytes,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(method: Method, url: &'a UrlParts) -> Self {
        Self {
            method,
            url,
            headers: None,
            jar: None,
            body: Bytes::new(),
        }
    }

    pub fn headers(mut self, headers: &'a OrderedHeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Attach a jar; its applicable cookies become a single `cookie` header.
    pub fn cookies(mut self, jar: Option<&'a CookieJar>) -> Self {
        self.jar = jar;
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> PreparedRequest {
        let headers = self.headers.cloned().unwrap_or_default();
        let cookie = self
            .jar
            .filter(|jar| !jar.is_empty())
            .map(|jar| jar.serve(self.url, None))
            .filter(|line| !line.is_empty());

        let mut head = format!(
            "{} {} HTTP/1.1\r\n",
            self.method,
            self.url.request_target()
        );
        for (name, value) in headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        if let Some(line) = &cookie {
            head.push_str("cookie: ");
            head.push_str(line);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut raw = BytesMut::with_capacity(head.len() + self.body.len());
        raw.put_slice(head.as_bytes());
        raw.put_slice(&self.body);

        PreparedRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            cookie,
            body: self.body,
            raw: raw.freeze(),
        }
    }
}
