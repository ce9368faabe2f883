use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::CanonicalCookie;
use crate::cookies::parser::{parse_cookie_line, ParsedCookieLine};
use crate::cookies::persistence;
use crate::http::urlparts::UrlParts;
use std::io;
use std::path::{Path, PathBuf};

/// Result of [`CookieJar::store_from_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored(CanonicalCookie),
    /// A deletion marker removed the named cookie.
    Removed(String),
}

/// Cookie store for one client session.
///
/// Cookies are keyed by name only, jar-wide: storing `id` from one site
/// replaces an `id` stored from any other site. Domain and path only matter
/// when cookies are served.
///
/// The jar has no internal locking; share it behind a `Mutex` if needed.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<CanonicalCookie>,
    save_path: Option<PathBuf>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// A jar that [`save`](Self::save)s to `path`. Nothing is loaded.
    pub fn with_persistence(path: impl Into<PathBuf>) -> Self {
        Self {
            cookies: Vec::new(),
            save_path: Some(path.into()),
        }
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    /// Parse a `Set-Cookie` line and apply it.
    pub fn store_from_line(
        &mut self,
        line: &str,
        origin: Option<&UrlParts>,
    ) -> Result<StoreOutcome, NetError> {
        match parse_cookie_line(line, origin) {
            ParsedCookieLine::Cookie(cookie) => {
                tracing::debug!(name = cookie.name(), "storing cookie");
                Ok(StoreOutcome::Stored(self.add(cookie).clone()))
            }
            ParsedCookieLine::DeletionMarker(name) => {
                self.remove(&name)?;
                Ok(StoreOutcome::Removed(name))
            }
            ParsedCookieLine::ParseFailure => Err(NetError::CookieParseFailed),
        }
    }

    /// Store `cookie`, replacing any cookie with the same name in place.
    pub fn add(&mut self, cookie: CanonicalCookie) -> &CanonicalCookie {
        let idx = match self.cookies.iter().position(|c| c.name() == cookie.name()) {
            Some(idx) => {
                self.cookies[idx] = cookie;
                idx
            }
            None => {
                self.cookies.push(cookie);
                self.cookies.len() - 1
            }
        };
        &self.cookies[idx]
    }

    pub fn remove(&mut self, name: &str) -> Result<CanonicalCookie, NetError> {
        let idx = self
            .cookies
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| NetError::CookieNotFound(name.to_string()))?;
        Ok(self.cookies.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&CanonicalCookie> {
        self.cookies.iter().find(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalCookie> {
        self.cookies.iter()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// `Cookie` header value for `url`: every applicable cookie as
    /// `name=value`, joined with `"; "`. Empty when nothing applies.
    pub fn serve(&self, url: &UrlParts, as_of: Option<i64>) -> String {
        self.cookies
            .iter()
            .filter(|c| c.is_valid(Some(url), as_of))
            .map(|c| c.cookie_line(true))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Every unexpired cookie as a full `Set-Cookie` line, CRLF-separated.
    /// Expiry is checked against the current clock.
    pub fn export(&self) -> String {
        self.cookies
            .iter()
            .filter(|c| c.is_valid(None, None))
            .map(|c| c.cookie_line(false))
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    /// Store every line of an exported cookie file. A missing file is an
    /// empty jar. Returns the number of cookies stored.
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<usize> {
        persistence::load_cookies(self, path.as_ref())
    }

    /// Write [`export`](Self::export) to the configured path, if any.
    pub fn save(&self) -> io::Result<()> {
        match &self.save_path {
            Some(path) => persistence::save_cookies(self, path),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a CookieJar {
    type Item = &'a CanonicalCookie;
    type IntoIter = std::slice::Iter<'a, CanonicalCookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.cookies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> UrlParts {
        UrlParts::validate(s).unwrap()
    }

    #[test]
    fn test_add_replaces_by_name() {
        let mut jar = CookieJar::new();
        jar.add(CanonicalCookie::new("a", "1").unwrap());
        jar.add(CanonicalCookie::new("b", "2").unwrap());
        jar.add(CanonicalCookie::new("a", "3").unwrap());

        assert_eq!(jar.len(), 2);
        assert_eq!(jar.get("a").map(|c| c.value()), Some("3"));
        // Replacement keeps the original position.
        assert_eq!(jar.serve(&url("http://example.com/"), None), "a=3; b=2");
    }

    #[test]
    fn test_remove_missing() {
        let mut jar = CookieJar::new();
        assert!(matches!(
            jar.remove("nope"),
            Err(NetError::CookieNotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_store_from_line_outcomes() {
        let mut jar = CookieJar::new();
        let origin = url("http://example.com/");

        assert!(matches!(
            jar.store_from_line("token=abc", Some(&origin)),
            Ok(StoreOutcome::Stored(_))
        ));
        assert_eq!(
            jar.store_from_line("token=", Some(&origin)).unwrap(),
            StoreOutcome::Removed("token".into())
        );
        assert!(matches!(
            jar.store_from_line("token=", Some(&origin)),
            Err(NetError::CookieNotFound(_))
        ));
        assert!(matches!(
            jar.store_from_line("garbage", Some(&origin)),
            Err(NetError::CookieParseFailed)
        ));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_serve_filters_by_scope() {
        let mut jar = CookieJar::new();
        jar.store_from_line("a=1; Domain=example.com", None).unwrap();
        jar.store_from_line("b=2; Domain=other.org", None).unwrap();
        jar.store_from_line("c=3; Path=/admin/", None).unwrap();

        assert_eq!(jar.serve(&url("http://www.example.com/"), None), "a=1");
        assert_eq!(jar.serve(&url("http://www.example.com/admin/x"), None), "a=1; c=3");
        assert_eq!(jar.serve(&url("http://nowhere.net/"), None), "");
    }

    #[test]
    fn test_export_drops_expired() {
        let mut jar = CookieJar::new();
        jar.store_from_line("old=1; expires=Thu, 01 Jan 1998 00:00:00 GMT", None)
            .unwrap();
        jar.store_from_line("new=2; Domain=.example.com; secure", None)
            .unwrap();

        assert_eq!(jar.export(), "new=2; Domain=.example.com; secure");
    }

    #[test]
    fn test_save_without_path_is_noop() {
        let mut jar = CookieJar::new();
        jar.add(CanonicalCookie::new("a", "1").unwrap());
        assert!(jar.save().is_ok());
        assert!(jar.save_path().is_none());
    }
}
