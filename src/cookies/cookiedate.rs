//! Cookie date handling.
//!
//! `expires` attributes show up in several shapes on the wire. The accepted
//! inputs are:
//!
//! - a bare unix timestamp (`1445412480`)
//! - RFC 1123 (`Wed, 21 Oct 2015 07:28:00 GMT`)
//! - the Netscape dash form (`Wed, 21-Oct-2015 07:28:00 GMT`)
//! - asctime (`Wed Oct 21 07:28:00 2015`)
//! - RFC 3339 (`2015-10-21T07:28:00Z`)
//!
//! Output always uses the Netscape dash form.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Parse an expiration string into epoch seconds.
pub fn parse_cookie_date(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let digits = input.strip_prefix('-').unwrap_or(input);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return input.parse::<i64>().ok();
    }

    if let Ok(dt) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(dt.unix_timestamp());
    }

    let normalized = normalize(input);

    let rfc1123 = format_description!(
        "[day padding:none] [month repr:short case_sensitive:false] [year] [hour]:[minute]:[second] GMT"
    );
    let netscape = format_description!(
        "[day padding:none]-[month repr:short case_sensitive:false]-[year] [hour]:[minute]:[second] GMT"
    );
    let asctime = format_description!(
        "[month repr:short case_sensitive:false] [day padding:none] [hour]:[minute]:[second] [year]"
    );

    [rfc1123, netscape, asctime]
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(&normalized, *fmt).ok())
        .map(|dt| dt.assume_utc().unix_timestamp())
}

/// Drop the weekday, collapse whitespace and spell the zone as `GMT`.
fn normalize(input: &str) -> String {
    let rest = match input.split_once(',') {
        Some((_, rest)) => rest,
        None => input,
    };

    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    // asctime: weekday followed by month
    if tokens.len() > 1 && is_alphabetic(tokens[0]) && is_alphabetic(tokens[1]) {
        tokens.remove(0);
    }

    tokens
        .into_iter()
        .map(|token| {
            if token.eq_ignore_ascii_case("utc") || token.eq_ignore_ascii_case("gmt") {
                "GMT"
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_alphabetic(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_alphabetic())
}

/// Format epoch seconds as `Wed, 21-Oct-2015 07:28:00 GMT`.
pub fn format_cookie_date(epoch: i64) -> Option<String> {
    let format = format_description!(
        "[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
    );
    OffsetDateTime::from_unix_timestamp(epoch)
        .ok()?
        .format(&format)
        .ok()
}
