//! Scanner module - the bounded-concurrency scan engine.
//!
//! One probe is dispatched per port. A semaphore caps how many probes are
//! in flight, so peak socket usage stays at the configured limit no matter
//! how large the port range is. Results go to a [`ResultSink`] in
//! completion order as soon as each probe finishes.

pub mod sink;
pub mod tcp;
pub mod traits;
pub mod udp;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{PortRange, ScanTarget};
use futures::stream::{self, Stream};
use futures::FutureExt;
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

pub use sink::{ChannelSink, CollectSink, ResultSink};
pub use tcp::TcpProber;
pub use traits::{ProbeResult, Prober, Protocol, ScanConfig};
pub use udp::UdpProber;

/// Totals for a finished scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub protocol: Protocol,
    /// Results delivered to the sink.
    pub ports_scanned: usize,
    /// Results classified open (or responding, for UDP).
    pub open_ports: usize,
    /// Probes that panicked; their ports are reported closed.
    pub failed_probes: usize,
    pub duration: Duration,
}

/// Build the prober for a configuration.
pub fn create_prober(config: &ScanConfig) -> Arc<dyn Prober> {
    match config.protocol {
        Protocol::Tcp => Arc::new(TcpProber::new(
            config.connect_timeout,
            config.read_timeout,
            config.capture_banner,
        )),
        Protocol::Udp => {
            if config.capture_banner {
                warn!("banner capture only applies to TCP scans; ignoring");
            }
            Arc::new(UdpProber::new(config.connect_timeout, config.read_timeout))
        }
    }
}

/// Probes every port of a range against one host.
pub struct ScanEngine {
    host: Arc<str>,
    ip: IpAddr,
    prober: Arc<dyn Prober>,
    concurrency_limit: usize,
}

impl ScanEngine {
    /// Create an engine for `host` (already resolved to `ip`).
    pub fn new(host: &str, ip: IpAddr, config: &ScanConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            host: Arc::from(host),
            ip,
            prober: create_prober(config),
            concurrency_limit: config.concurrency_limit,
        })
    }

    /// Create an engine around a custom prober.
    pub fn with_prober(
        host: &str,
        ip: IpAddr,
        prober: Arc<dyn Prober>,
        concurrency_limit: usize,
    ) -> ConfigResult<Self> {
        if concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(Self {
            host: Arc::from(host),
            ip,
            prober,
            concurrency_limit,
        })
    }

    pub fn protocol(&self) -> Protocol {
        self.prober.protocol()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Probe every port in `ports`, delivering each result to `sink`.
    ///
    /// Returns only after every dispatched probe has finished and released
    /// its permit. Individual probe failures never abort the scan.
    pub async fn run(&self, ports: &PortRange, sink: Arc<dyn ResultSink>) -> ScanSummary {
        let start_time = Instant::now();
        let protocol = self.prober.protocol();

        info!(
            host = %self.host,
            ip = %self.ip,
            %protocol,
            ports = ports.len(),
            concurrency = self.concurrency_limit,
            "starting scan"
        );

        let semaphore = Arc::new(Semaphore::new(
            self.concurrency_limit.min(Semaphore::MAX_PERMITS),
        ));
        let mut workers = JoinSet::new();
        let mut tally = Tally::default();

        for port in ports.iter() {
            // Blocks dispatch until a token is free. The semaphore is local
            // and never closed, so acquisition cannot fail.
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };

            let target = ScanTarget::new(Arc::clone(&self.host), self.ip, port);
            let prober = Arc::clone(&self.prober);
            let sink = Arc::clone(&sink);

            workers.spawn(async move {
                let outcome = AssertUnwindSafe(prober.probe(&target))
                    .catch_unwind()
                    .await;
                drop(permit);

                let (result, panicked) = match outcome {
                    Ok(result) => (result, false),
                    Err(_) => {
                        error!(port = %target.port, "probe panicked; reporting port closed");
                        (ProbeResult::closed(target.port, protocol), true)
                    }
                };

                let open = result.open;
                sink.emit(result);
                Outcome { open, panicked }
            });

            // Reap finished workers so the set stays bounded by the limit.
            while let Some(joined) = workers.try_join_next() {
                tally.record(joined);
            }
        }

        while let Some(joined) = workers.join_next().await {
            tally.record(joined);
        }

        let summary = ScanSummary {
            protocol,
            ports_scanned: tally.scanned,
            open_ports: tally.open,
            failed_probes: tally.failed,
            duration: start_time.elapsed(),
        };

        info!(
            scanned = summary.ports_scanned,
            open = summary.open_ports,
            elapsed_ms = summary.duration.as_millis() as u64,
            "scan complete"
        );

        summary
    }

    /// Run a scan and collect all results.
    pub async fn collect(&self, ports: &PortRange) -> Vec<ProbeResult> {
        let sink = Arc::new(CollectSink::new());
        self.run(ports, Arc::clone(&sink) as Arc<dyn ResultSink>).await;
        sink.take()
    }

    /// Run a scan in the background and stream its results.
    ///
    /// The stream ends once every port has produced its result. Results
    /// queue in an unbounded channel, so a consumer slower than the probes
    /// buffers at most one result per port of `ports`. Dropping the stream
    /// early discards the remaining results; the scan still runs to
    /// completion in the background.
    pub fn stream(self: Arc<Self>, ports: PortRange) -> impl Stream<Item = ProbeResult> + Send {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let sink: Arc<dyn ResultSink> = Arc::new(ChannelSink::new(tx));
            self.run(&ports, sink).await;
        });

        stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|r| (r, rx)) })
    }
}

/// What a worker reports back after emitting its result.
#[derive(Debug, Clone, Copy)]
struct Outcome {
    open: bool,
    panicked: bool,
}

#[derive(Debug, Default)]
struct Tally {
    scanned: usize,
    open: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, joined: Result<Outcome, JoinError>) {
        match joined {
            Ok(outcome) => {
                self.scanned += 1;
                if outcome.open {
                    self.open += 1;
                }
                if outcome.panicked {
                    self.failed += 1;
                }
            }
            // Workers are never aborted, so this only happens if the
            // runtime is shutting down.
            Err(e) => {
                error!(error = %e, "probe task failed");
                self.failed += 1;
            }
        }
    }
}
