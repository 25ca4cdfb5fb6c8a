//! Plain text output formatting.
//!
//! One line per open port, plus one line per captured banner. Lines for a
//! single result are written under one lock so concurrent workers never
//! interleave them.

use crate::scanner::{ProbeResult, Protocol, ResultSink};
use console::style;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::debug;

/// Line-oriented result sink.
pub struct PlainSink<W> {
    out: Mutex<W>,
    show_closed: bool,
    colored: bool,
}

impl<W: Write + Send> PlainSink<W> {
    /// Create a sink writing to `out`. Closed ports are only written when
    /// `show_closed` is set.
    pub fn new(out: W, show_closed: bool) -> Self {
        Self {
            out: Mutex::new(out),
            show_closed,
            colored: false,
        }
    }

    /// Color status lines (green when open).
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_result(&self, result: &ProbeResult) -> io::Result<()> {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let line = status_line(result);
        match (self.colored, result.open) {
            (false, _) => writeln!(out, "{}", line)?,
            (true, true) => writeln!(out, "{}", style(line).green())?,
            (true, false) => writeln!(out, "{}", style(line).dim())?,
        }

        if let Some(banner) = &result.banner {
            writeln!(out, "[Banner {}] {}", result.port, banner)?;
        }

        out.flush()
    }
}

impl<W: Write + Send> ResultSink for PlainSink<W> {
    fn emit(&self, result: ProbeResult) {
        if !result.open && !self.show_closed {
            return;
        }
        if let Err(e) = self.write_result(&result) {
            debug!(error = %e, port = %result.port, "failed to write result");
        }
    }
}

/// The status line for a result, without styling.
pub fn status_line(result: &ProbeResult) -> String {
    let state = match (result.protocol, result.open) {
        (Protocol::Tcp, true) => "is open",
        (Protocol::Tcp, false) => "is closed",
        (Protocol::Udp, true) => "is open or responding",
        (Protocol::Udp, false) => "is closed or filtered",
    };
    format!("{} {} {}", result.protocol, result.port, state)
}

/// Print the line announcing a scan.
pub fn print_scan_header(protocol: Protocol, host: &str, ports: usize, threads: usize) {
    println!(
        "Starting {} scan on {} ({} ports) with {} threads...",
        style(protocol).yellow(),
        style(host).bold(),
        ports,
        threads
    );
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
