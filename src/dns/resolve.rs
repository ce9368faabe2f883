//! The `Resolve` trait and the resolvers built on top of it.

use crate::base::neterror::NetError;
use std::{
    collections::HashMap,
    fmt,
    future::Future,
    io,
    net::{IpAddr, SocketAddr},
    pin::Pin,
    sync::Arc,
};

/// A host name to resolve.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by a DNS resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, NetError>> + Send>>;

/// Trait for DNS resolution.
///
/// Returned addresses carry port 0; [`resolve_host`] fills in the port.
/// An empty answer should be reported as an error, not an empty iterator.
pub trait Resolve: Send + Sync {
    fn resolve(&self, name: Name) -> Resolving;
}

impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

/// Resolve `host` to socket addresses on `port`.
///
/// IP literals are returned as-is without asking the resolver.
pub async fn resolve_host(
    resolver: &dyn Resolve,
    host: &str,
    port: u16,
) -> Result<Vec<SocketAddr>, NetError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, port)]);
    }

    let addrs: Vec<SocketAddr> = resolver
        .resolve(Name::from(host))
        .await?
        .map(|mut addr| {
            addr.set_port(port);
            addr
        })
        .collect();

    if addrs.is_empty() {
        return Err(NetError::dns_failed(
            host,
            io::Error::new(io::ErrorKind::NotFound, "resolver returned no addresses"),
        ));
    }
    Ok(addrs)
}

/// Resolver that answers fixed host names itself and delegates the rest.
///
/// Used to point a host name at a local test server, or to pin a host to a
/// known address.
///
/// # Example
///
/// ```rust,ignore
/// use cookienet::dns::{DnsResolverWithOverrides, GaiResolver};
///
/// let resolver = DnsResolverWithOverrides::new(Arc::new(GaiResolver::new()))
///     .with_override("www.example.com", "127.0.0.1".parse().unwrap());
/// ```
pub struct DnsResolverWithOverrides {
    inner: Arc<dyn Resolve>,
    overrides: HashMap<String, Vec<IpAddr>>,
}

impl DnsResolverWithOverrides {
    pub fn new(inner: Arc<dyn Resolve>) -> Self {
        Self {
            inner,
            overrides: HashMap::new(),
        }
    }

    /// Answer `host` with `ip` (in addition to earlier overrides for it).
    pub fn with_override(mut self, host: impl Into<String>, ip: IpAddr) -> Self {
        self.overrides
            .entry(host.into().to_ascii_lowercase())
            .or_default()
            .push(ip);
        self
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl Resolve for DnsResolverWithOverrides {
    fn resolve(&self, name: Name) -> Resolving {
        if let Some(ips) = self.overrides.get(&name.as_str().to_ascii_lowercase()) {
            tracing::debug!(host = %name, "answering from overrides");
            let addrs: Addrs = Box::new(
                ips.clone()
                    .into_iter()
                    .map(|ip| SocketAddr::new(ip, 0))
                    .collect::<Vec<_>>()
                    .into_iter(),
            );
            return Box::pin(std::future::ready(Ok(addrs)));
        }
        self.inner.resolve(name)
    }
}

impl fmt::Debug for DnsResolverWithOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsResolverWithOverrides")
            .field("override_count", &self.overrides.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    struct FixedResolver(Vec<SocketAddr>);

    impl Resolve for FixedResolver {
        fn resolve(&self, _name: Name) -> Resolving {
            let addrs = self.0.clone();
            Box::pin(async move { Ok(Box::new(addrs.into_iter()) as Addrs) })
        }
    }

    struct FailingResolver;

    impl Resolve for FailingResolver {
        fn resolve(&self, name: Name) -> Resolving {
            Box::pin(async move {
                Err(NetError::dns_failed(
                    name.as_str(),
                    io::Error::new(io::ErrorKind::NotFound, "no such host"),
                ))
            })
        }
    }

    #[test]
    fn test_name() {
        let name = Name::from("example.com");
        assert_eq!(name.as_str(), "example.com");
        assert_eq!(name.to_string(), "example.com");
    }

    #[tokio::test]
    async fn test_resolve_host_sets_port() {
        let resolver = FixedResolver(vec!["93.184.216.34:0".parse().unwrap()]);
        let addrs = resolve_host(&resolver, "example.com", 8080).await.unwrap();
        assert_eq!(addrs, vec!["93.184.216.34:8080".parse().unwrap()]);
    }

    #[tokio::test]
    async fn test_ip_literal_skips_resolver() {
        let addrs = resolve_host(&FailingResolver, "127.0.0.1", 80).await.unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:80".parse().unwrap()]);
    }

    #[tokio::test]
    async fn test_empty_answer_is_error() {
        let err = resolve_host(&FixedResolver(vec![]), "example.com", 80)
            .await
            .unwrap_err();
        assert!(matches!(err, NetError::NameNotResolvedFor { .. }));
    }

    #[tokio::test]
    async fn test_override_hit_and_miss() {
        let resolver = DnsResolverWithOverrides::new(Arc::new(FailingResolver))
            .with_override("Test.Example.com", IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(resolver.override_count(), 1);

        let addrs = resolve_host(&resolver, "test.example.com", 9000).await.unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:9000".parse().unwrap()]);

        let err = resolve_host(&resolver, "other.example.com", 80).await.unwrap_err();
        assert_eq!(err.as_i32(), -105);
    }
}
