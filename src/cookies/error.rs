//! Cookie construction errors.
//!
//! These are argument errors: the caller supplied a field the cookie model
//! cannot hold. Operational failures (an unparseable `Set-Cookie` line, a
//! missing cookie on removal) are reported through
//! [`NetError`](crate::base::neterror::NetError) instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CookieError {
    #[error("cookie name must be a non-empty string")]
    EmptyName,

    #[error("cookie name contains forbidden characters: {0:?}")]
    InvalidName(String),

    #[error("cookie value contains control characters")]
    InvalidValue,

    #[error("cookie expiration is neither an epoch nor a date: {0:?}")]
    InvalidExpiration(String),

    #[error("cookie path must be absolute: {0:?}")]
    InvalidPath(String),

    #[error("cookie domain is invalid: {0:?}")]
    InvalidDomain(String),
}
