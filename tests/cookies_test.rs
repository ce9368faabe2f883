use cookienet::base::neterror::NetError;
use cookienet::cookies::canonical_cookie::{CanonicalCookie, CookieDomain};
use cookienet::cookies::cookiejar::{CookieJar, StoreOutcome};
use cookienet::cookies::error::CookieError;
use cookienet::cookies::parser::{parse_cookie_line, ParsedCookieLine};
use cookienet::http::urlparts::UrlParts;

fn url(s: &str) -> UrlParts {
    UrlParts::validate(s).unwrap()
}

fn parse(line: &str, origin: &str) -> CanonicalCookie {
    match parse_cookie_line(line, Some(&url(origin))) {
        ParsedCookieLine::Cookie(c) => c,
        other => panic!("expected a cookie, got {other:?}"),
    }
}

#[test]
fn test_scope_domain_path_and_security() {
    let cookie = parse(
        "sid=abc123; Domain=.example.com; Path=/app/; secure",
        "https://sub.example.com/app/page",
    );

    assert!(cookie.is_valid(Some(&url("https://sub.example.com/app/other")), None));
    // Insecure scheme
    assert!(!cookie.is_valid(Some(&url("http://sub.example.com/app/other")), None));
    // Domain mismatch
    assert!(!cookie.is_valid(Some(&url("https://other.com/app/x")), None));
    // Outside the path scope
    assert!(!cookie.is_valid(Some(&url("https://sub.example.com/admin/")), None));
}

#[test]
fn test_two_label_domain_is_lenient() {
    let cookie = CanonicalCookie::builder("a", "1")
        .domain("example.com")
        .finish()
        .unwrap();
    assert!(cookie.is_valid_domain("example.com"));
    assert!(cookie.is_valid_domain("www.example.com"));
}

#[test]
fn test_three_label_domain_is_exact() {
    let cookie = CanonicalCookie::builder("a", "1")
        .domain("www.example.com")
        .finish()
        .unwrap();
    assert!(cookie.is_valid_domain("www.example.com"));
    assert!(!cookie.is_valid_domain("example.com"));
    assert!(!cookie.is_valid_domain("api.www.example.com"));
}

#[test]
fn test_root_path_matches_everything() {
    let cookie = parse("a=1; Path=/", "http://example.com/deep/page");
    assert!(cookie.is_valid_path("/"));
    assert!(cookie.is_valid_path("/any/where"));
}

#[test]
fn test_export_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.txt");
    let origin = url("https://shop.example.com/cart/view");

    let mut jar = CookieJar::with_persistence(&path);
    jar.store_from_line("sid=abc; Domain=.example.com; Path=/; secure; httponly", Some(&origin))
        .unwrap();
    jar.store_from_line("lang=en; expires=Fri, 01 Jan 2100 00:00:00 GMT", Some(&origin))
        .unwrap();
    jar.save().unwrap();

    let mut reloaded = CookieJar::new();
    assert_eq!(reloaded.load(&path).unwrap(), 2);

    let target = url("https://shop.example.com/cart/checkout");
    assert_eq!(jar.serve(&target, None), "sid=abc; lang=en");
    assert_eq!(reloaded.serve(&target, None), jar.serve(&target, None));
}

#[test]
fn test_reload_keeps_escaped_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.txt");

    let mut jar = CookieJar::with_persistence(&path);
    jar.store_from_line("v=a%2541", None).unwrap();
    jar.store_from_line("note=50%25%20off%2C%20today", None).unwrap();
    assert_eq!(jar.get("v").unwrap().value(), "a%41");
    jar.save().unwrap();

    let mut reloaded = CookieJar::new();
    assert_eq!(reloaded.load(&path).unwrap(), 2);
    assert_eq!(reloaded.get("v").unwrap().value(), "a%41");
    assert_eq!(reloaded.get("note").unwrap().value(), "50% off, today");
}

#[test]
fn test_name_collision_keeps_latest() {
    let mut jar = CookieJar::new();
    jar.store_from_line("id=first", Some(&url("http://one.example.org/")))
        .unwrap();
    jar.store_from_line("id=second", Some(&url("http://another.test.net/")))
        .unwrap();

    assert_eq!(jar.len(), 1);
    let id = jar.get("id").unwrap();
    assert_eq!(id.value(), "second");
    assert_eq!(id.domain(), &CookieDomain::Host("another.test.net".into()));
}

#[test]
fn test_deletion_marker() {
    let mut jar = CookieJar::new();
    jar.store_from_line("token=xyz", None).unwrap();

    let outcome = jar.store_from_line("token=", None).unwrap();
    assert_eq!(outcome, StoreOutcome::Removed("token".into()));
    assert!(jar.is_empty());

    assert!(matches!(
        jar.store_from_line("token=", None),
        Err(NetError::CookieNotFound(name)) if name == "token"
    ));
}

#[test]
fn test_unparseable_line() {
    let mut jar = CookieJar::new();
    assert!(matches!(
        jar.store_from_line("just-a-name", None),
        Err(NetError::CookieParseFailed)
    ));
    assert!(jar.is_empty());
}

#[test]
fn test_construction_errors_are_distinct() {
    assert!(matches!(CanonicalCookie::new("", "v"), Err(CookieError::EmptyName)));
    assert!(matches!(
        CanonicalCookie::builder("a", "v").path("relative").finish(),
        Err(CookieError::InvalidPath(_))
    ));
    assert!(matches!(
        CanonicalCookie::builder("a", "v").expires("next tuesday").finish(),
        Err(CookieError::InvalidExpiration(_))
    ));
}

#[test]
fn test_expired_cookie_not_served() {
    let mut jar = CookieJar::new();
    jar.add(
        CanonicalCookie::builder("old", "1")
            .expires(1_000_000_000_i64)
            .finish()
            .unwrap(),
    );
    jar.add(CanonicalCookie::new("session", "2").unwrap());

    let target = url("http://example.com/");
    assert_eq!(jar.serve(&target, None), "session=2");
    assert_eq!(jar.export(), "session=2");
}
