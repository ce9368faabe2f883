//! Raw response decoding.
//!
//! Splits the bytes returned by a transport into status, headers and body,
//! removes chunked framing, gunzips `Content-Encoding: gzip` payloads and
//! hands `Set-Cookie` values to the cookie jar.

use crate::base::neterror::NetError;
use crate::cookies::cookiejar::CookieJar;
use crate::http::chunked::decode_chunked;
use crate::http::method::Method;
use crate::http::response::{HttpResponse, ResponseHeaders};
use crate::http::urlparts::UrlParts;
use bytes::Bytes;
use flate2::read::GzDecoder;
use regex::Regex;
use std::io::Read;
use std::sync::LazyLock;

static STATUS_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([1-5][0-9]{2})\b").expect("status pattern is a valid regex")
});

/// Accepted status codes. 550 and above are treated as garbage.
const STATUS_RANGE: std::ops::RangeInclusive<u16> = 100..=549;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Decode a raw HTTP/1.1 response.
///
/// For HEAD requests the whole (trimmed) payload is the header block and the
/// body is empty.
pub fn parse_response(raw: &[u8], method: Method) -> Result<HttpResponse, NetError> {
    let (status, headers, body) = split_response(raw, method)?;
    let body = decode_body(&headers, body)?;
    tracing::debug!(status, body_len = body.len(), "response decoded");
    Ok(HttpResponse::new(status, headers, body))
}

/// Split a raw response into status, headers and the still-encoded body.
///
/// Nothing in the body is inspected, so header-level state such as
/// `Set-Cookie` can be acted on even when body decoding later fails.
pub fn split_response(
    raw: &[u8],
    method: Method,
) -> Result<(u16, ResponseHeaders, Bytes), NetError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(NetError::EmptyResponse);
    }

    let (head, body) = if method == Method::Head {
        (raw.trim_ascii(), &raw[raw.len()..])
    } else {
        match raw
            .windows(HEADER_TERMINATOR.len())
            .position(|w| w == HEADER_TERMINATOR)
        {
            Some(idx) => (&raw[..idx], &raw[idx + HEADER_TERMINATOR.len()..]),
            None => (raw, &raw[raw.len()..]),
        }
    };

    let (status, headers) = parse_head(&String::from_utf8_lossy(head))?;
    Ok((status, headers, Bytes::copy_from_slice(body)))
}

/// Remove chunked framing, then gunzip, as announced by `headers`.
pub fn decode_body(headers: &ResponseHeaders, body: Bytes) -> Result<Bytes, NetError> {
    let mut payload = body;
    if headers
        .first("transfer-encoding")
        .is_some_and(|te| te.eq_ignore_ascii_case("chunked"))
    {
        payload = decode_chunked(&payload)?;
    }
    if headers
        .first("content-encoding")
        .is_some_and(|ce| ce.eq_ignore_ascii_case("gzip"))
    {
        payload = gunzip(&payload)?;
    }
    Ok(payload)
}

/// Parse the status line and header lines.
pub fn parse_head(head: &str) -> Result<(u16, ResponseHeaders), NetError> {
    let mut lines = head.split("\r\n");
    let status_line = lines.next().ok_or(NetError::InvalidHttpResponse)?;
    let status = STATUS_CODE
        .captures(status_line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .filter(|code| STATUS_RANGE.contains(code))
        .ok_or(NetError::InvalidHttpResponse)?;

    let mut headers = ResponseHeaders::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if !name.trim().is_empty() {
                headers.append(name, value);
            }
        }
    }

    Ok((status, headers))
}

fn gunzip(payload: &[u8]) -> Result<Bytes, NetError> {
    let mut decoded = Vec::new();
    GzDecoder::new(payload)
        .read_to_end(&mut decoded)
        .map_err(|e| {
            tracing::debug!(error = %e, "gzip decoding failed");
            NetError::ContentDecodingFailed
        })?;
    Ok(Bytes::from(decoded))
}

/// Store every `Set-Cookie` value in `headers` in `jar`, using `origin` for
/// default domain and path. Returns the number of lines accepted.
pub fn store_response_cookies(
    headers: &ResponseHeaders,
    jar: &mut CookieJar,
    origin: &UrlParts,
) -> usize {
    let mut stored = 0;
    for line in headers.get_all("set-cookie") {
        match jar.store_from_line(line, Some(origin)) {
            Ok(_) => stored += 1,
            Err(e) => tracing::debug!(error = %e, line, "ignoring Set-Cookie line"),
        }
    }
    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_parse_simple_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello";
        let resp = parse_response(raw, Method::Get).unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers().first("content-type"), Some("text/plain"));
        assert_eq!(resp.body(), &Bytes::from("hello"));
    }

    #[test]
    fn test_body_may_contain_blank_lines() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\nline1\r\n\r\nline2";
        let resp = parse_response(raw, Method::Get).unwrap();
        assert_eq!(resp.text(), "line1\r\n\r\nline2");
    }

    #[test]
    fn test_head_has_empty_body() {
        let raw = b"HTTP/1.1 204 No Content\r\nServer: test\r\n\r\n";
        let resp = parse_response(raw, Method::Head).unwrap();
        assert_eq!(resp.status(), 204);
        assert_eq!(resp.headers().first("server"), Some("test"));
        assert!(resp.body().is_empty());
    }

    #[test]
    fn test_chunked_then_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"compressed payload").unwrap();
        let gz = encoder.finish().unwrap();

        let mut raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Encoding: gzip\r\n\r\n"
            .to_vec();
        raw.extend_from_slice(format!("{:x}\r\n", gz.len()).as_bytes());
        raw.extend_from_slice(&gz);
        raw.extend_from_slice(b"\r\n0\r\n\r\n");

        let resp = parse_response(&raw, Method::Get).unwrap();
        assert_eq!(resp.text(), "compressed payload");
    }

    #[test]
    fn test_unknown_encoding_passes_through() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Encoding: br\r\n\r\n\x01\x02";
        let resp = parse_response(raw, Method::Get).unwrap();
        assert_eq!(resp.body(), &Bytes::from_static(b"\x01\x02"));
    }

    #[test]
    fn test_bad_gzip_fails() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\nnot gzip";
        assert!(matches!(
            parse_response(raw, Method::Get),
            Err(NetError::ContentDecodingFailed)
        ));
    }

    #[test]
    fn test_status_out_of_range() {
        assert!(matches!(
            parse_head("HTTP/1.1 599 Nope"),
            Err(NetError::InvalidHttpResponse)
        ));
        assert!(matches!(
            parse_head("HTTP/1.1 550 Nope"),
            Err(NetError::InvalidHttpResponse)
        ));
        assert_eq!(parse_head("HTTP/1.0 549 Edge").unwrap().0, 549);
        assert_eq!(parse_head("HTTP/1.1 100 Continue").unwrap().0, 100);
    }

    #[test]
    fn test_status_with_high_middle_digit() {
        assert_eq!(parse_head("HTTP/1.1 451 Unavailable For Legal Reasons").unwrap().0, 451);
        assert_eq!(parse_head("HTTP/1.1 299 Misc").unwrap().0, 299);
        assert_eq!(parse_head("HTTP/1.1 159 Odd").unwrap().0, 159);
    }

    #[test]
    fn test_split_leaves_body_encoded() {
        let raw = b"HTTP/1.1 200 OK\r\nSet-Cookie: sid=1\r\nContent-Encoding: gzip\r\n\r\nnot gzip";
        let (status, headers, body) = split_response(raw, Method::Get).unwrap();
        assert_eq!(status, 200);
        assert_eq!(headers.get_all("set-cookie"), vec!["sid=1"]);
        assert_eq!(body, Bytes::from_static(b"not gzip"));
        assert!(matches!(
            decode_body(&headers, body),
            Err(NetError::ContentDecodingFailed)
        ));
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(
            parse_response(b"  \r\n", Method::Get),
            Err(NetError::EmptyResponse)
        ));
    }

    #[test]
    fn test_header_value_keeps_colons() {
        let (_, headers) = parse_head("HTTP/1.1 302 Found\r\nLocation: http://x.example.com:8080/").unwrap();
        assert_eq!(headers.first("location"), Some("http://x.example.com:8080/"));
    }
}
