//! Cookie parsing, scope matching and storage.
//!
//! | Type | Responsibility |
//! |------|----------------|
//! | [`CanonicalCookie`](canonical_cookie::CanonicalCookie) | One immutable cookie and its domain/path/security/expiry checks |
//! | [`parse_cookie_line`](parser::parse_cookie_line) | `Set-Cookie` line → cookie, deletion marker or failure |
//! | [`CookieJar`](cookiejar::CookieJar) | Name-keyed store; serves `Cookie` headers and exports lines |
//! | [`persistence`] | Load/save the exported lines to disk |
//!
//! # Example
//!
//! ```rust
//! use cookienet::cookies::cookiejar::CookieJar;
//! use cookienet::http::urlparts::UrlParts;
//!
//! let origin = UrlParts::validate("https://www.example.com/app/login").unwrap();
//! let mut jar = CookieJar::new();
//! jar.store_from_line("sid=abc; Domain=.example.com; secure", Some(&origin))
//!     .unwrap();
//!
//! let next = UrlParts::validate("https://api.example.com/app/data").unwrap();
//! assert_eq!(jar.serve(&next, None), "sid=abc");
//! ```
//!
//! The jar holds at most one cookie per name, whatever site set it.

pub mod canonical_cookie;
pub mod cookiedate;
pub mod cookiejar;
pub mod error;
pub mod parser;
pub mod persistence;

pub use canonical_cookie::{CanonicalCookie, CookieBuilder, CookieDomain, Expiry};
pub use cookiejar::{CookieJar, StoreOutcome};
pub use error::CookieError;
pub use parser::ParsedCookieLine;
