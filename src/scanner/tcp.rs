//! TCP connect prober.
//!
//! Completes the full handshake through the OS socket API. A port is open
//! when the connection is established within the connect timeout.

use crate::banner::read_banner;
use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{ProbeResult, Prober, Protocol};
use crate::types::ScanTarget;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// TCP connect prober with optional passive banner capture.
#[derive(Debug, Clone)]
pub struct TcpProber {
    connect_timeout: Duration,
    read_timeout: Duration,
    capture_banner: bool,
}

impl TcpProber {
    /// Create a new TCP prober.
    ///
    /// # Arguments
    /// * `connect_timeout` - Bound on connection establishment
    /// * `read_timeout` - Bound on the banner read
    /// * `capture_banner` - Whether to read a banner from open ports
    pub fn new(connect_timeout: Duration, read_timeout: Duration, capture_banner: bool) -> Self {
        Self {
            connect_timeout,
            read_timeout,
            capture_banner,
        }
    }

    async fn attempt_connect(&self, addr: SocketAddr) -> ScanResult<TcpStream> {
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ScanError::from_io(e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn probe(&self, target: &ScanTarget) -> ProbeResult {
        let start = Instant::now();

        let mut stream = match self.attempt_connect(target.socket_addr()).await {
            Ok(stream) => stream,
            Err(e) => {
                debug!(%target, reason = %e, "tcp port not open");
                return ProbeResult::closed(target.port, Protocol::Tcp);
            }
        };

        let result =
            ProbeResult::open(target.port, Protocol::Tcp).with_response_time(start.elapsed());

        let banner = if self.capture_banner {
            read_banner(&mut stream, self.read_timeout).await
        } else {
            None
        };

        // Closed here on every path once the optional read is done.
        drop(stream);

        result.with_banner(banner)
    }
}
