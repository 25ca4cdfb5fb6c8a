//! JSON-lines output: one serialized result per line.

use crate::scanner::{ProbeResult, ResultSink};
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::debug;

/// Result sink writing newline-delimited JSON.
pub struct JsonSink<W> {
    out: Mutex<W>,
    show_closed: bool,
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W, show_closed: bool) -> Self {
        Self {
            out: Mutex::new(out),
            show_closed,
        }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_result(&self, result: &ProbeResult) -> io::Result<()> {
        let line = serde_json::to_string(result).map_err(io::Error::other)?;
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(out, "{}", line)?;
        out.flush()
    }
}

impl<W: Write + Send> ResultSink for JsonSink<W> {
    fn emit(&self, result: ProbeResult) {
        if !result.open && !self.show_closed {
            return;
        }
        if let Err(e) = self.write_result(&result) {
            debug!(error = %e, port = %result.port, "failed to write result");
        }
    }
}
