//! Target host handling.
//!
//! A host is validated and resolved to a single address once, before any
//! probe is issued. Each probe then gets its own immutable [`ScanTarget`].

use super::Port;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// A single `(host, port)` pair to probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTarget {
    /// The host as the user wrote it.
    pub host: Arc<str>,
    /// The address the host resolved to.
    pub ip: IpAddr,
    /// Port to probe.
    pub port: Port,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(host: Arc<str>, ip: IpAddr, port: Port) -> Self {
        Self { host, ip, port }
    }

    /// Socket address for connecting to this target.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port.as_u16())
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Error type for host validation and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("host must not be empty")]
    Empty,
    #[error("malformed host: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve host '{0}': {1}")]
    ResolutionFailed(String, String),
    #[error("no addresses found for host '{0}'")]
    NoAddressesFound(String),
}

/// Resolve a host (IP literal or hostname) to one address.
///
/// When a name resolves to both families the first IPv4 address wins,
/// since most services that listen on `localhost` bind 127.0.0.1.
pub async fn resolve_host(host: &str) -> Result<IpAddr, TargetError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(TargetError::Empty);
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    // Bracketed IPv6 literal, e.g. "[::1]"
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return inner
            .parse::<IpAddr>()
            .map_err(|_| TargetError::InvalidFormat(host.to_string()));
    }

    if !is_valid_hostname(host) {
        return Err(TargetError::InvalidFormat(host.to_string()));
    }

    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| TargetError::ResolutionFailed(host.to_string(), e.to_string()))?
        .map(|addr| addr.ip())
        .collect();

    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| TargetError::NoAddressesFound(host.to_string()))
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label must be 1-63 characters, alphanumeric at both ends,
    // hyphens allowed in between. A trailing dot (FQDN) is tolerated.
    s.trim_end_matches('.').split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.starts_with(|c: char| c.is_ascii_alphanumeric())
            && label.ends_with(|c: char| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn test_resolve_ip_literals() {
        assert_eq!(
            resolve_host("127.0.0.1").await.unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
        assert_eq!(
            resolve_host("::1").await.unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
        assert_eq!(
            resolve_host("[::1]").await.unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ip = resolve_host("localhost").await.unwrap();
        assert!(ip.is_loopback());
    }

    #[tokio::test]
    async fn test_resolve_rejects_malformed() {
        assert!(matches!(resolve_host("").await, Err(TargetError::Empty)));
        assert!(matches!(resolve_host("   ").await, Err(TargetError::Empty)));
        assert!(matches!(
            resolve_host("bad host!").await,
            Err(TargetError::InvalidFormat(_))
        ));
        assert!(matches!(
            resolve_host("[not-an-ip]").await,
            Err(TargetError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("sub.example.com."));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-invalid.com"));
        assert!(!is_valid_hostname("a..b"));
        assert!(!is_valid_hostname("under_score.com"));
    }

    #[test]
    fn test_scan_target_addr() {
        let port = Port::new(8080).unwrap();
        let target = ScanTarget::new(Arc::from("localhost"), IpAddr::V4(Ipv4Addr::LOCALHOST), port);
        assert_eq!(target.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(target.to_string(), "localhost:8080");
    }
}
