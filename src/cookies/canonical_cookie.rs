use crate::cookies::cookiedate::{format_cookie_date, parse_cookie_date};
use crate::cookies::error::CookieError;
use crate::http::urlparts::{dir_path, encode_component, UrlParts};
use std::fmt;
use time::OffsetDateTime;

/// Domain scope of a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CookieDomain {
    /// Matches every host.
    #[default]
    Any,
    /// A host or `.domain` pattern.
    Host(String),
}

impl CookieDomain {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CookieDomain::Any => None,
            CookieDomain::Host(d) => Some(d),
        }
    }
}

/// Expiration input accepted by [`CookieBuilder::expires`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// Epoch seconds; 0 is a session cookie.
    Epoch(i64),
    /// A date string in any format [`parse_cookie_date`] understands.
    Text(String),
}

impl From<i64> for Expiry {
    fn from(epoch: i64) -> Self {
        Expiry::Epoch(epoch)
    }
}

impl From<&str> for Expiry {
    fn from(text: &str) -> Self {
        Expiry::Text(text.to_string())
    }
}

impl From<String> for Expiry {
    fn from(text: String) -> Self {
        Expiry::Text(text)
    }
}

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`, reduced to the fields
/// this client stores. Fields are fixed after construction; a jar updates a
/// cookie by replacing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    name: String,
    value: String,
    expires: i64,
    path: String,
    domain: CookieDomain,
    secure: bool,
    http_only: bool,
}

impl CanonicalCookie {
    /// A session cookie valid for every host and path.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, CookieError> {
        Self::builder(name, value).finish()
    }

    pub fn builder(name: impl Into<String>, value: impl Into<String>) -> CookieBuilder {
        CookieBuilder {
            name: name.into(),
            value: value.into(),
            expires: Expiry::Epoch(0),
            path: "/".to_string(),
            domain: CookieDomain::Any,
            secure: false,
            http_only: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expiration in epoch seconds, 0 for a session cookie.
    pub fn expires(&self) -> i64 {
        self.expires
    }

    pub fn is_session(&self) -> bool {
        self.expires == 0
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> &CookieDomain {
        &self.domain
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Stored for round-tripping only; this client runs no scripts.
    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Check if the cookie applies.
    ///
    /// With a URL, domain, path and security must all match. The time check
    /// always applies: a non-session cookie is expired when the reference time
    /// (`as_of`, or the cookie's own expiry when `None`) is in the past.
    pub fn is_valid(&self, url: Option<&UrlParts>, as_of: Option<i64>) -> bool {
        if let Some(url) = url {
            if !self.is_valid_domain(url.host())
                || !self.is_valid_path(url.path())
                || !self.is_valid_security(url.scheme().is_secure())
            {
                return false;
            }
        }

        if self.expires == 0 {
            return true;
        }
        let reference = as_of.unwrap_or(self.expires);
        reference >= OffsetDateTime::now_utc().unix_timestamp()
    }

    /// Domain matching, label by label from the right.
    ///
    /// A leading `.` (or a bare two-label domain, as legacy browsers did)
    /// extends the match to subdomains; anything else needs an exact host.
    pub fn is_valid_domain(&self, host: &str) -> bool {
        let domain = match &self.domain {
            CookieDomain::Any => return true,
            CookieDomain::Host(d) => d,
        };

        let mut labels: Vec<&str> = domain.split('.').collect();
        let include_subdomains = if labels.first() == Some(&"") {
            labels.remove(0);
            true
        } else {
            labels.len() == 2
        };

        let candidate: Vec<&str> = host.split('.').collect();
        if candidate.len() < labels.len() {
            return false;
        }
        if candidate.len() > labels.len() && !include_subdomains {
            return false;
        }

        labels
            .iter()
            .rev()
            .zip(candidate.iter().rev())
            .all(|(want, got)| want.eq_ignore_ascii_case(got))
    }

    /// Path matching against the directory portion of the cookie path.
    pub fn is_valid_path(&self, url_path: &str) -> bool {
        if self.path == "/" {
            return true;
        }

        let scope = dir_path(&self.path).trim_start_matches('/');
        let scope = scope.strip_suffix('/').unwrap_or(scope);
        if scope.is_empty() {
            return true;
        }

        let mut candidate = url_path.trim_start_matches('/').split('/');
        scope.split('/').all(|label| candidate.next() == Some(label))
    }

    pub fn is_valid_security(&self, secure_scheme: bool) -> bool {
        !self.secure || secure_scheme
    }

    /// `name=value` when `request_only`, otherwise the full `Set-Cookie`
    /// form with every non-default attribute. The full form percent-encodes
    /// name and value so it parses back to the same cookie.
    pub fn cookie_line(&self, request_only: bool) -> String {
        if request_only {
            return format!("{}={}", self.name, self.value);
        }

        let mut line = format!(
            "{}={}",
            encode_component(&self.name),
            encode_component(&self.value)
        );

        if let CookieDomain::Host(domain) = &self.domain {
            line.push_str("; Domain=");
            line.push_str(domain);
        }
        if self.path != "/" {
            line.push_str("; Path=");
            line.push_str(&self.path);
        }
        if self.expires != 0 {
            if let Some(date) = format_cookie_date(self.expires) {
                line.push_str("; expires=");
                line.push_str(&date);
            }
        }
        if self.secure {
            line.push_str("; secure");
        }
        if self.http_only {
            line.push_str("; httponly");
        }
        line
    }
}

impl fmt::Display for CanonicalCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Validating constructor for [`CanonicalCookie`].
#[derive(Debug, Clone)]
#[must_use]
pub struct CookieBuilder {
    name: String,
    value: String,
    expires: Expiry,
    path: String,
    domain: CookieDomain,
    secure: bool,
    http_only: bool,
}

impl CookieBuilder {
    pub fn expires(mut self, expires: impl Into<Expiry>) -> Self {
        self.expires = expires.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Restrict the cookie to a host or `.domain`. An empty string means
    /// [`CookieDomain::Any`].
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.domain = if domain.is_empty() {
            CookieDomain::Any
        } else {
            CookieDomain::Host(domain)
        };
        self
    }

    pub fn any_domain(mut self) -> Self {
        self.domain = CookieDomain::Any;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Validate every field and build the cookie.
    pub fn finish(self) -> Result<CanonicalCookie, CookieError> {
        if self.name.is_empty() {
            return Err(CookieError::EmptyName);
        }
        if self
            .name
            .chars()
            .any(|c| c.is_control() || c.is_whitespace() || c == '=' || c == ';')
        {
            return Err(CookieError::InvalidName(self.name));
        }
        if self.value.chars().any(|c| c.is_control() || c == ';') {
            return Err(CookieError::InvalidValue);
        }

        let expires = match self.expires {
            Expiry::Epoch(epoch) => epoch,
            Expiry::Text(text) => match parse_cookie_date(&text) {
                Some(epoch) => epoch,
                None => return Err(CookieError::InvalidExpiration(text)),
            },
        };
        if OffsetDateTime::from_unix_timestamp(expires).is_err() {
            return Err(CookieError::InvalidExpiration(expires.to_string()));
        }

        if !self.path.starts_with('/') {
            return Err(CookieError::InvalidPath(self.path));
        }

        if let CookieDomain::Host(domain) = &self.domain {
            let bare = domain.strip_prefix('.').unwrap_or(domain);
            let valid_label =
                |label: &str| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !bare.split('.').all(valid_label) {
                return Err(CookieError::InvalidDomain(domain.clone()));
            }
        }

        Ok(CanonicalCookie {
            name: self.name,
            value: self.value,
            expires,
            path: self.path,
            domain: self.domain,
            secure: self.secure,
            http_only: self.http_only,
        })
    }
}
