//! Output formatting module.
//!
//! Result sinks for plain text and JSON-lines output, a progress-bar
//! decorator, and user-facing message helpers.

mod json_format;
mod plain;
mod progress;

pub use json_format::JsonSink;
pub use plain::{print_error, print_scan_header, print_warning, status_line, PlainSink};
pub use progress::ProgressSink;

use crate::scanner::ResultSink;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Create a sink writing `format` to stdout.
pub fn stdout_sink(format: OutputFormat, show_closed: bool) -> Arc<dyn ResultSink> {
    match format {
        OutputFormat::Plain => Arc::new(
            PlainSink::new(io::stdout(), show_closed).with_color(console::colors_enabled()),
        ),
        OutputFormat::Json => Arc::new(JsonSink::new(io::stdout(), show_closed)),
    }
}
