//! Progress bar decoration for any result sink.

use crate::scanner::{ProbeResult, ResultSink};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Wraps a sink and advances a progress bar on stderr per result.
///
/// The bar is hidden while the inner sink writes so result lines stay intact.
pub struct ProgressSink {
    inner: Arc<dyn ResultSink>,
    bar: ProgressBar,
}

impl ProgressSink {
    pub fn new(inner: Arc<dyn ResultSink>, total: usize) -> Self {
        Self::with_bar(inner, ProgressBar::new(total as u64))
    }

    fn with_bar(inner: Arc<dyn ResultSink>, bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        Self { inner, bar }
    }

    /// Remove the bar once the scan is done.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ResultSink for ProgressSink {
    fn emit(&self, result: ProbeResult) {
        if result.open {
            self.bar.set_message(format!("found {} {}", result.protocol, result.port));
        }
        self.bar.suspend(|| self.inner.emit(result));
        self.bar.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{CollectSink, Protocol};
    use crate::types::Port;

    #[test]
    fn test_progress_forwards_and_counts() {
        let inner = Arc::new(CollectSink::new());
        let sink = ProgressSink::with_bar(
            Arc::clone(&inner) as Arc<dyn ResultSink>,
            ProgressBar::hidden(),
        );

        for p in 1..=3 {
            sink.emit(ProbeResult::closed(Port::new(p).unwrap(), Protocol::Tcp));
        }
        sink.finish();

        assert_eq!(sink.position(), 3);
        assert_eq!(inner.take().len(), 3);
    }
}
