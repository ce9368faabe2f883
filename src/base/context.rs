//! IO error context for transports and resolvers.

use crate::base::neterror::NetError;
use crate::http::urlparts::UrlParts;
use std::io;

/// Extension trait turning `io::Error` results into `NetError`s that name
/// what was being talked to.
pub trait IoResultExt<T> {
    /// Attach the request target to a socket error.
    ///
    /// Timeouts, resets and aborts keep their own codes since the connection
    /// was already up when they happened.
    fn target_context(self, url: &UrlParts) -> Result<T, NetError>;

    /// Attach the looked-up host name to a resolver error.
    fn lookup_context(self, host: &str) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn target_context(self, url: &UrlParts) -> Result<T, NetError> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => NetError::from(e),
            _ => NetError::connection_failed_to(url.host(), url.port(), e),
        })
    }

    fn lookup_context(self, host: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(host, e))
    }
}
