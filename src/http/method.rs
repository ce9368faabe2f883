//! Request methods accepted by the client.

use crate::base::neterror::NetError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
            Method::Options => "OPTIONS",
        }
    }

    /// POST and PUT are the only methods that carry a request body.
    pub fn sends_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }

    pub(crate) fn to_http(self) -> http::Method {
        match self {
            Method::Get => http::Method::GET,
            Method::Head => http::Method::HEAD,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Delete => http::Method::DELETE,
            Method::Trace => http::Method::TRACE,
            Method::Options => http::Method::OPTIONS,
        }
    }
}

impl FromStr for Method {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "TRACE" => Ok(Method::Trace),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(NetError::MethodNotSupported),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Options".parse::<Method>().unwrap(), Method::Options);
    }

    #[test]
    fn test_unsupported_method() {
        assert!(matches!(
            "PATCH".parse::<Method>(),
            Err(NetError::MethodNotSupported)
        ));
    }

    #[test]
    fn test_sends_body() {
        assert!(Method::Put.sends_body());
        assert!(!Method::Delete.sends_body());
        assert_eq!(Method::default(), Method::Get);
    }
}
