//! Command-line interface definitions for portprobe.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags are
//! accepted both GNU-style (`--host x`) and with a single dash
//! (`-host x`, `-ports=1-100`); the latter are rewritten before parsing.

mod scan;

pub use scan::{execute, scan_config};

use crate::output::OutputFormat;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

/// Long flag names that may also be written with a single dash.
const LONG_FLAGS: &[&str] = &[
    "host",
    "ports",
    "udp",
    "banners",
    "threads",
    "connect-timeout",
    "read-timeout",
    "output",
    "show-closed",
    "progress",
    "config",
    "verbose",
    "help",
    "version",
];

/// Printed above the usage text.
const BANNER: &str = r"
                   _                      _
  _ __   ___  _ __| |_ _ __  _ __ ___  | |__   ___
 | '_ \ / _ \| '__| __| '_ \| '__/ _ \ | '_ \ / _ \
 | |_) | (_) | |  | |_| |_) | | | (_) || |_) |  __/
 | .__/ \___/|_|   \__| .__/|_|  \___/ |_.__/ \___|
 |_|                  |_|
";

/// Probe a host for TCP ports that accept connections or UDP ports that answer.
#[derive(Parser, Debug)]
#[command(name = "portprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A bounded-concurrency TCP/UDP port reachability probe", long_about = None)]
#[command(before_help = BANNER)]
#[command(after_help = "UDP results are heuristic: a port that drops the probe \
                        silently is reported the same as a closed or filtered one.")]
pub struct Cli {
    /// Host to scan
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Port range to scan (e.g., 20-80)
    #[arg(long, default_value = "1-1024")]
    pub ports: String,

    /// Use UDP instead of TCP
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        hide_possible_values = true
    )]
    pub udp: bool,

    /// Try to grab service banners on open TCP ports
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        hide_possible_values = true
    )]
    pub banners: bool,

    /// Number of concurrent probes [default: 100]
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// TCP connect / UDP dial timeout in milliseconds [default: 500]
    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Banner (TCP) or response (UDP) read timeout in milliseconds [default: 2000 TCP, 1000 UDP]
    #[arg(long, value_name = "MS")]
    pub read_timeout: Option<u64>,

    /// Output format [default: plain]
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Also report ports that are not open
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        hide_possible_values = true
    )]
    pub show_closed: bool,

    /// Show a progress bar on stderr
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        hide_possible_values = true
    )]
    pub progress: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Rewrite single-dash long flags (`-host`) to their double-dash form.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut terminated = false;

    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || terminated {
                return arg;
            }

            let rewritten = arg.to_str().and_then(|s| {
                if s == "--" {
                    terminated = true;
                    return None;
                }
                let flag = s.strip_prefix('-').filter(|f| !f.starts_with('-'))?;
                let name = flag.split('=').next().unwrap_or(flag);
                LONG_FLAGS.contains(&name).then(|| OsString::from(format!("-{}", s)))
            });

            rewritten.unwrap_or(arg)
        })
        .collect()
}

/// Parse the process arguments and run a scan.
pub async fn run() -> anyhow::Result<ExitCode> {
    run_from(std::env::args_os()).await
}

/// Parse `args` (program name first) and run a scan.
///
/// With no arguments at all, prints usage and fails.
pub async fn run_from<I, T>(args: I) -> anyhow::Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if args.len() <= 1 {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    }

    let cli = Cli::parse_from(normalize_args(args));
    execute(&cli).await?;
    Ok(ExitCode::SUCCESS)
}
