//! Result sinks.
//!
//! The engine hands every [`ProbeResult`] to a sink as soon as its probe
//! completes. Workers call [`ResultSink::emit`] concurrently, so each sink
//! serializes its own state.

use crate::scanner::traits::ProbeResult;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Receives probe results in completion order.
pub trait ResultSink: Send + Sync {
    /// Deliver one result. Called from many workers at once.
    fn emit(&self, result: ProbeResult);
}

/// Collects every result in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    results: Mutex<Vec<ProbeResult>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the collected results, leaving the sink empty.
    pub fn take(&self) -> Vec<ProbeResult> {
        match self.results.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ResultSink for CollectSink {
    fn emit(&self, result: ProbeResult) {
        match self.results.lock() {
            Ok(mut guard) => guard.push(result),
            Err(poisoned) => poisoned.into_inner().push(result),
        }
    }
}

/// Forwards results into an unbounded channel.
///
/// Results sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProbeResult>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ProbeResult>) -> Self {
        Self { tx }
    }
}

impl ResultSink for ChannelSink {
    fn emit(&self, result: ProbeResult) {
        let _ = self.tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::traits::Protocol;
    use crate::types::Port;

    fn result(port: u16) -> ProbeResult {
        ProbeResult::open(Port::new(port).unwrap(), Protocol::Tcp)
    }

    #[test]
    fn test_collect_sink_take() {
        let sink = CollectSink::new();
        sink.emit(result(80));
        sink.emit(result(443));

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        sink.emit(result(22));
        drop(sink);

        assert_eq!(rx.recv().await.map(|r| r.port.as_u16()), Some(22));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ChannelSink::new(tx).emit(result(1));
    }
}
