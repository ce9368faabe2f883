use crate::base::neterror::NetError;

#[test]
fn test_net_error_roundtrip() {
    // Standard Chromium error
    let original = NetError::ConnectionRefused;
    let code = original.as_i32();
    assert_eq!(code, -102);
    let converted = NetError::from(code);
    assert!(matches!(converted, NetError::ConnectionRefused));

    // Custom error
    let custom = NetError::CookieParseFailed;
    let custom_code = custom.as_i32();
    assert_eq!(custom_code, -902);
    let custom_converted = NetError::from(custom_code);
    assert!(matches!(custom_converted, NetError::CookieParseFailed));
}

#[test]
fn test_unknown_error() {
    let err = NetError::from(-9999);
    assert!(matches!(err, NetError::Unknown(-9999)));
}

#[test]
fn test_unassigned_http_codes_are_unknown() {
    for code in [-301, -320] {
        assert!(matches!(NetError::from(code), NetError::Unknown(c) if c == code));
    }
}

#[test]
fn test_collision_avoidance() {
    // Custom codes must not shadow the HTTP range
    let http_range = -399..=-300;

    for err in [
        NetError::InvalidHeader,
        NetError::ReservedHeader("cookie".into()),
        NetError::CookieParseFailed,
        NetError::CookieNotFound("sid".into()),
    ] {
        assert!(!http_range.contains(&err.as_i32()));
    }
}

#[test]
fn test_io_error_mapping() {
    let err: NetError = std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into();
    assert!(matches!(err, NetError::ConnectionRefused));

    let err: NetError = std::io::Error::from(std::io::ErrorKind::TimedOut).into();
    assert!(matches!(err, NetError::TimedOut));
}
