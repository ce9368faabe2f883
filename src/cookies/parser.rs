//! `Set-Cookie` line parsing.

use crate::cookies::canonical_cookie::CanonicalCookie;
use crate::http::urlparts::{decode_component, dir_path, UrlParts};

const SET_COOKIE_PREFIX: &str = "set-cookie:";

/// Outcome of parsing one cookie line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCookieLine {
    Cookie(CanonicalCookie),
    /// `name=` with an empty value: drop any stored cookie of that name.
    DeletionMarker(String),
    ParseFailure,
}

/// Parse a `Set-Cookie` value (an optional `Set-Cookie:` label is stripped).
///
/// Without an origin the cookie defaults to any domain and path `/`; with
/// one, to the origin host and the directory of the origin path.
pub fn parse_cookie_line(line: &str, origin: Option<&UrlParts>) -> ParsedCookieLine {
    let mut line = line.trim();
    if line
        .get(..SET_COOKIE_PREFIX.len())
        .is_some_and(|label| label.eq_ignore_ascii_case(SET_COOKIE_PREFIX))
    {
        line = line[SET_COOKIE_PREFIX.len()..].trim_start();
    }

    let mut segments = line.split(';');
    let Some((raw_name, raw_value)) = segments.next().and_then(|pair| pair.split_once('=')) else {
        return ParsedCookieLine::ParseFailure;
    };
    let name = decode_component(raw_name.trim());
    let value = decode_component(raw_value.trim());
    if name.is_empty() {
        return ParsedCookieLine::ParseFailure;
    }
    if value.is_empty() {
        return ParsedCookieLine::DeletionMarker(name);
    }

    let mut builder = CanonicalCookie::builder(name, value);
    if let Some(origin) = origin {
        builder = builder.domain(origin.host()).path(dir_path(origin.path()));
    }

    for attribute in segments {
        let (key, val) = match attribute.trim().split_once('=') {
            Some((key, val)) => (key.trim(), val.trim()),
            None => (attribute.trim(), ""),
        };
        builder = match key.to_ascii_lowercase().as_str() {
            "expires" => builder.expires(val),
            "path" => builder.path(dir_path(val)),
            "domain" => builder.domain(val),
            "secure" => builder.secure(true),
            "httponly" => builder.http_only(true),
            _ => builder,
        };
    }

    match builder.finish() {
        Ok(cookie) => ParsedCookieLine::Cookie(cookie),
        Err(e) => {
            tracing::debug!(error = %e, "rejecting cookie line");
            ParsedCookieLine::ParseFailure
        }
    }
}
