//! Prober trait abstraction.
//!
//! Defines the per-port probe interface shared by the TCP and UDP
//! implementations, plus the result and configuration types that flow
//! through the scan engine.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Port, ScanTarget};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default connect (TCP) or dial (UDP) timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
/// Default banner read timeout for TCP.
pub const DEFAULT_TCP_READ_TIMEOUT: Duration = Duration::from_secs(2);
/// Default response read timeout for UDP.
pub const DEFAULT_UDP_READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Default number of probes in flight.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Transport protocol used for probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

/// Outcome of probing a single port.
///
/// For UDP, `open` means "open or responding": a port that silently drops
/// the probe is indistinguishable from a closed or filtered one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The port that was probed.
    pub port: Port,
    /// Protocol used for the probe.
    pub protocol: Protocol,
    /// Whether the port accepted a connection (TCP) or answered (UDP).
    pub open: bool,
    /// Text the service sent unprompted after connecting, trimmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Time until the port was classified open, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ProbeResult {
    /// A port that accepted or answered the probe.
    pub fn open(port: Port, protocol: Protocol) -> Self {
        Self {
            port,
            protocol,
            open: true,
            banner: None,
            response_time_ms: None,
        }
    }

    /// A port that did not.
    pub fn closed(port: Port, protocol: Protocol) -> Self {
        Self {
            open: false,
            ..Self::open(port, protocol)
        }
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Set the response time.
    pub fn with_response_time(mut self, elapsed: Duration) -> Self {
        self.response_time_ms = Some(elapsed.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }
}

/// Configuration for one scan run.
///
/// `read_timeout` bounds the banner read for TCP and the response read for
/// UDP; its default differs per protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub protocol: Protocol,
    pub concurrency_limit: usize,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub capture_banner: bool,
}

impl ScanConfig {
    /// Create a configuration with the defaults for `protocol`.
    pub fn new(protocol: Protocol) -> Self {
        let read_timeout = match protocol {
            Protocol::Tcp => DEFAULT_TCP_READ_TIMEOUT,
            Protocol::Udp => DEFAULT_UDP_READ_TIMEOUT,
        };

        Self {
            protocol,
            concurrency_limit: DEFAULT_CONCURRENCY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout,
            capture_banner: false,
        }
    }

    /// Set the concurrency limit.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Set the connect (or UDP dial) timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Enable passive banner capture.
    pub fn with_banners(mut self) -> Self {
        self.capture_banner = true;
        self
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("connect"));
        }
        if self.read_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("read"));
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(Protocol::Tcp)
    }
}

/// A single-port probe.
///
/// Implementations must bound every network wait with a timeout and must
/// never fail: any error is folded into a not-open [`ProbeResult`].
#[async_trait]
pub trait Prober: Send + Sync {
    /// Protocol this prober speaks.
    fn protocol(&self) -> Protocol;

    /// Probe one target.
    async fn probe(&self, target: &ScanTarget) -> ProbeResult;
}
