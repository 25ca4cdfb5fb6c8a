//! UDP prober.
//!
//! UDP is connectionless, so openness is inferred: send a small fixed
//! payload and treat any reply within the read timeout as "open or
//! responding". Silence is reported as not open, which means a filtered
//! port and an open service that ignores the payload look the same as a
//! closed port. That ambiguity is inherent and is passed on to the caller.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{ProbeResult, Prober, Protocol};
use crate::types::ScanTarget;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

/// Payload sent to every port.
pub const PROBE_PAYLOAD: &[u8] = b"ping";

/// Maximum reply size read back. Content is ignored.
const RECV_BUFFER_SIZE: usize = 1024;

/// UDP prober.
#[derive(Debug, Clone)]
pub struct UdpProber {
    dial_timeout: Duration,
    read_timeout: Duration,
}

impl UdpProber {
    /// Create a new UDP prober.
    pub fn new(dial_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            dial_timeout,
            read_timeout,
        }
    }

    /// Bind an ephemeral local socket and connect it to the target.
    async fn dial(&self, addr: SocketAddr) -> ScanResult<UdpSocket> {
        let local = match addr.ip() {
            IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };

        let dial = async {
            let socket = UdpSocket::bind(local).await?;
            socket.connect(addr).await?;
            Ok::<_, std::io::Error>(socket)
        };

        match timeout(self.dial_timeout, dial).await {
            Ok(Ok(socket)) => Ok(socket),
            Ok(Err(e)) => Err(ScanError::from_io(e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }

    async fn exchange(&self, addr: SocketAddr) -> ScanResult<()> {
        let socket = self.dial(addr).await?;

        socket.send(PROBE_PAYLOAD).await.map_err(ScanError::from_io)?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        match timeout(self.read_timeout, socket.recv(&mut buf)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ScanError::from_io(e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

#[async_trait]
impl Prober for UdpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    async fn probe(&self, target: &ScanTarget) -> ProbeResult {
        let start = Instant::now();

        // The socket lives inside `exchange` and is closed when it returns.
        match self.exchange(target.socket_addr()).await {
            Ok(()) => {
                ProbeResult::open(target.port, Protocol::Udp).with_response_time(start.elapsed())
            }
            Err(e) => {
                debug!(%target, reason = %e, "udp port not responding");
                ProbeResult::closed(target.port, Protocol::Udp)
            }
        }
    }
}
