//! URL validation and decomposition.
//!
//! Only a conservative subset of URLs is accepted: an optional `http`/`https`
//! scheme, a dotted hostname, IPv4 literal or `localhost`, an optional port, an
//! absolute path built from a restricted character set, and a `key=value`
//! query string. The query string is re-parsed and rebuilt so that
//! permissive senders' encoding quirks do not reach the wire.

use crate::base::neterror::NetError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::LazyLock;
use url::form_urlencoded;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:(?P<scheme>https?)://)?",
        r"(?P<host>(?:[a-z0-9\-]{1,63}\.){1,5}[a-z]+",
        r"|(?:(?:[12]\d\d|\d\d|\d)\.){3}(?:[12]\d\d|\d\d|\d)",
        r"|localhost)",
        r"(?::(?P<port>[1-9][0-9]{0,4}))?",
        r"(?P<path>(?:/[_\-A-Za-z0-9.@\[\]%]+)*/?)",
        r"(?:\?(?P<query>(?:[0-9a-z_A-Z\-]+=[\S ]*&?)*))?$",
    ))
    .expect("URL pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }
}

/// A validated URL broken into the pieces the request engine needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    original: String,
    scheme: Scheme,
    host: String,
    port: u16,
    path: String,
    query: String,
}

impl UrlParts {
    /// Validate `url` and decompose it.
    ///
    /// The port defaults to 80/443 by scheme, the path to `/`. The query string
    /// is canonicalized (duplicate keys collapse to the last value).
    pub fn validate(url: &str) -> Result<Self, NetError> {
        let caps = URL_PATTERN.captures(url).ok_or(NetError::InvalidUrl)?;

        let scheme = match caps.name("scheme") {
            Some(s) if s.as_str().eq_ignore_ascii_case("https") => Scheme::Https,
            _ => Scheme::Http,
        };

        let host = caps
            .name("host")
            .map(|h| h.as_str().to_ascii_lowercase())
            .ok_or(NetError::InvalidUrl)?;
        if host.bytes().all(|b| b.is_ascii_digit() || b == b'.') && host.parse::<Ipv4Addr>().is_err()
        {
            return Err(NetError::InvalidUrl);
        }

        let port = match caps.name("port") {
            Some(p) => p.as_str().parse::<u16>().map_err(|_| NetError::InvalidUrl)?,
            None => scheme.default_port(),
        };

        let path = match caps.name("path").map(|p| p.as_str()) {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => "/".to_string(),
        };

        let query = caps
            .name("query")
            .map(|q| canonical_query(q.as_str()))
            .unwrap_or_default();

        Ok(Self {
            original: url.to_string(),
            scheme,
            host,
            port,
            path,
            query,
        })
    }

    /// Returns true if `url` passes [`UrlParts::validate`].
    pub fn is_valid(url: &str) -> bool {
        Self::validate(url).is_ok()
    }

    /// The URL exactly as supplied by the caller.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Canonical query string without the leading `?`. Empty when absent.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_default_port(&self) -> bool {
        self.port == self.scheme.default_port()
    }

    /// Rebuild the query string from `raw`.
    pub fn set_query(&mut self, raw: &str) {
        self.query = canonical_query(raw.trim_start_matches('?'));
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Path plus query, as it appears in the request line.
    pub fn request_target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    /// Value for the `Host` header.
    pub fn host_header(&self) -> String {
        if self.is_default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Absolute URL handed to the library transport; ports 80 and 443 are omitted.
    pub fn absolute_url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme.as_str(), self.host);
        if self.port != 80 && self.port != 443 {
            url.push_str(&format!(":{}", self.port));
        }
        url.push_str(&self.request_target());
        url
    }
}

impl fmt::Display for UrlParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.absolute_url())
    }
}

/// Re-parse a query string into pairs and serialize them again.
pub(crate) fn canonical_query(raw: &str) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value.into_owned(),
            None => pairs.push((key.into_owned(), value.into_owned())),
        }
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}

/// Bytes escaped when a cookie name or value is written back out.
const COOKIE_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b',')
    .add(b';')
    .add(b'=')
    .add(b'\\');

/// Percent-decode a single cookie name or value. A literal `+` is kept.
pub(crate) fn decode_component(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Inverse of [`decode_component`].
pub(crate) fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COOKIE_COMPONENT).to_string()
}

/// Directory portion of a path: everything up to and including the last `/`.
pub(crate) fn dir_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}
