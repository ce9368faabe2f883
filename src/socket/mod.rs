//! Sockets for the request engine, mirroring Chromium's `net/socket/`:
//! - [`client`]: a connected TCP or TLS stream
//! - [`connectjob`]: DNS → TCP → TLS connection flow
//! - [`tls`]: TLS configuration with BoringSSL
//!
//! Every connection is used for exactly one request and then closed; there is
//! no pool.

pub mod client;
pub mod connectjob;
pub mod tls;
