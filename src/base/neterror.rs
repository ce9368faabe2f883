use std::io;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Connection to {host}:{port} failed: {source}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        source: Arc<io::Error>,
    },
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Name {domain} not resolved: {source}")]
    NameNotResolvedFor {
        domain: String,
        source: Arc<io::Error>,
    },
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("Operation timed out")]
    TimedOut,
    #[error("Invalid argument")]
    InvalidArgument,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Invalid chunked encoding")]
    InvalidChunkedEncoding,
    #[error("Method not supported")]
    MethodNotSupported,
    #[error("Empty response")]
    EmptyResponse,
    #[error("Content decoding failed")]
    ContentDecodingFailed,
    #[error("Incomplete chunked encoding")]
    IncompleteChunkedEncoding,
    #[error("Invalid HTTP response")]
    InvalidHttpResponse,

    // Request composition errors
    #[error("Invalid header")]
    InvalidHeader,
    #[error("Header {0} is computed by the client and cannot be set directly")]
    ReservedHeader(String),

    // Cookie jar errors
    #[error("Cookie line could not be parsed")]
    CookieParseFailed,
    #[error("No stored cookie named {0}")]
    CookieNotFound(String),

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::TimedOut => -7,
            NetError::InvalidArgument => -4,

            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailed | NetError::ConnectionFailedTo { .. } => -104,
            NetError::NameNotResolved | NetError::NameNotResolvedFor { .. } => -105,
            NetError::SslProtocolError => -107,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl => -300,
            NetError::InvalidChunkedEncoding => -321,
            NetError::MethodNotSupported => -322,
            NetError::EmptyResponse => -324,
            NetError::ContentDecodingFailed => -330,
            NetError::IncompleteChunkedEncoding => -355,
            NetError::InvalidHttpResponse => -370,

            // Custom codes starting at -900
            NetError::InvalidHeader => -900,
            NetError::ReservedHeader(_) => -901,
            NetError::CookieParseFailed => -902,
            NetError::CookieNotFound(_) => -903,
            NetError::Unknown(code) => *code,
        }
    }

    /// Connection failure with the target and the underlying IO error attached.
    pub fn connection_failed_to(host: impl Into<String>, port: u16, source: io::Error) -> Self {
        NetError::ConnectionFailedTo {
            host: host.into(),
            port,
            source: Arc::new(source),
        }
    }

    /// Resolution failure for `domain`.
    pub fn dns_failed(domain: impl Into<String>, source: io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.into(),
            source: Arc::new(source),
        }
    }

    /// Returns true for failures that happened before any byte reached the peer.
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            NetError::ConnectionRefused
                | NetError::ConnectionFailed
                | NetError::ConnectionFailedTo { .. }
                | NetError::NameNotResolved
                | NetError::NameNotResolvedFor { .. }
                | NetError::ConnectionTimedOut
                | NetError::SslProtocolError
        )
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -4 => NetError::InvalidArgument,
            -7 => NetError::TimedOut,
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -103 => NetError::ConnectionAborted,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -118 => NetError::ConnectionTimedOut,

            -300 => NetError::InvalidUrl,
            -321 => NetError::InvalidChunkedEncoding,
            -322 => NetError::MethodNotSupported,
            -324 => NetError::EmptyResponse,
            -330 => NetError::ContentDecodingFailed,
            -355 => NetError::IncompleteChunkedEncoding,
            -370 => NetError::InvalidHttpResponse,

            -900 => NetError::InvalidHeader,
            -902 => NetError::CookieParseFailed,
            _ => NetError::Unknown(code),
        }
    }
}

impl From<io::Error> for NetError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => NetError::ConnectionRefused,
            io::ErrorKind::ConnectionReset => NetError::ConnectionReset,
            io::ErrorKind::ConnectionAborted => NetError::ConnectionAborted,
            io::ErrorKind::TimedOut => NetError::TimedOut,
            io::ErrorKind::UnexpectedEof => NetError::ConnectionClosed,
            _ => NetError::ConnectionFailed,
        }
    }
}
