//! Host name resolution.
//!
//! The client resolves the target host before composing a request, so that a
//! name that does not resolve fails fast with
//! [`NetError::NameNotResolvedFor`](crate::base::neterror::NetError) instead
//! of surfacing as a generic connect error. Transports resolve again when they
//! connect, through the same [`Resolve`] implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use cookienet::dns::{resolve_host, GaiResolver};
//!
//! let addrs = resolve_host(&GaiResolver::new(), "example.com", 443).await?;
//! ```

mod gai;
mod resolve;

pub use gai::GaiResolver;
pub use resolve::{resolve_host, Addrs, DnsResolverWithOverrides, Name, Resolve, Resolving};
