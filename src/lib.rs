//! # portprobe - host port reachability probe
//!
//! Given a host and a port range, portprobe finds which ports accept TCP
//! connections or answer UDP datagrams within a bounded time, optionally
//! capturing the text banner a TCP service sends on connect.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portprobe::scanner::{Protocol, ScanConfig, ScanEngine};
//! use portprobe::types::{resolve_host, PortRange};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ports = PortRange::resolve("20-1024")?;
//!     let ip = resolve_host("localhost").await?;
//!     let config = ScanConfig::new(Protocol::Tcp).with_concurrency(200).with_banners();
//!
//!     let engine = ScanEngine::new("localhost", ip, &config)?;
//!     for result in engine.collect(&ports).await.iter().filter(|r| r.open) {
//!         println!("{} {} is open", result.protocol, result.port);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - validated ports, the port range resolver, host resolution
//! - [`scanner`] - the bounded-concurrency engine, TCP and UDP probers, result sinks
//! - [`output`] - console sinks (plain lines, JSON lines, progress bar)
//! - [`config`] - settings file
//! - [`cli`] - command-line glue
//! - [`error`] - error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ScanError};
pub use scanner::{ProbeResult, Protocol, ResultSink, ScanConfig, ScanEngine, ScanSummary};
pub use types::{InvalidRangeError, Port, PortRange, ScanTarget};
