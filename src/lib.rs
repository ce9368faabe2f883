//! # cookienet
//!
//! A minimal HTTP/1.1 client with a browser-like cookie jar.
//!
//! Every request opens its own connection, sends `Connection: Close` and
//! reads the response to the end. `Set-Cookie` headers feed a name-keyed
//! [`CookieJar`](cookies::CookieJar) that can be persisted to a text file
//! between runs.
//!
//! ## Features
//!
//! - **URL validation**: scheme, host, port, path and a canonicalized query
//! - **Cookie jar**: domain, path and security scope matching, expiry, and
//!   `Set-Cookie`-style persistence
//! - **Two transports**: raw TCP/TLS byte stream, or hyper's HTTP/1.1 client
//! - **Response decoding**: chunked transfer-encoding and gzip
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookienet::Client;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = Client::builder()
//!         .url("https://www.example.com/")
//!         .cookie_store(true)
//!         .build()
//!         .unwrap();
//!     let response = client.send().await.unwrap();
//!     println!("Status: {}", response.status());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Cookie model, parsing, jar and persistence
//! - [`dns`] - Pluggable host resolution
//! - [`http`] - URLs, request composition and response parsing
//! - [`socket`] - TCP/TLS connection setup
//! - [`transport`] - Raw and library request transports
//! - [`client`] - The request engine
//!
//! ## Limitations
//!
//! The jar is keyed by cookie name only. A cookie named `id` from one site
//! replaces a cookie named `id` from another.

pub mod base;
pub mod client;
pub mod cookies;
pub mod dns;
pub mod http;
pub mod socket;
pub mod transport;

pub use base::neterror::NetError;
pub use client::{Client, ClientBuilder};
pub use cookies::{CanonicalCookie, CookieJar};
pub use http::{HttpResponse, Method, UrlParts};
pub use transport::{Transport, TransportConfig, TransportKind};
