//! Scan execution for the command line.
//!
//! Resolves configuration (flags over settings file over defaults),
//! validates it, then runs the engine with a stdout sink.

use super::Cli;
use crate::config::Settings;
use crate::logging;
use crate::output::{self, OutputFormat, ProgressSink};
use crate::scanner::{Protocol, ResultSink, ScanConfig, ScanEngine};
use crate::types::{resolve_host, PortRange};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Build the scan configuration from flags and settings.
pub fn scan_config(cli: &Cli, settings: &Settings) -> ScanConfig {
    let protocol = if cli.udp { Protocol::Udp } else { Protocol::Tcp };

    let connect_timeout = cli
        .connect_timeout
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.connect_timeout());
    let read_timeout = cli
        .read_timeout
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.read_timeout(protocol));

    let config = ScanConfig::new(protocol)
        .with_concurrency(cli.threads.unwrap_or(settings.threads))
        .with_connect_timeout(connect_timeout)
        .with_read_timeout(read_timeout);

    if cli.banners {
        config.with_banners()
    } else {
        config
    }
}

/// Run the scan described by `cli`.
pub async fn execute(cli: &Cli) -> anyhow::Result<()> {
    logging::init(cli.verbose);

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    // Configuration errors are all reported before any probe is sent.
    let ports = PortRange::resolve(&cli.ports)?;
    let config = scan_config(cli, &settings);
    config.validate().context("invalid scan configuration")?;
    let ip = resolve_host(&cli.host).await?;

    let engine = ScanEngine::new(&cli.host, ip, &config)?;

    let format = cli.output.unwrap_or(settings.output);
    if format == OutputFormat::Plain {
        output::print_scan_header(
            engine.protocol(),
            &cli.host,
            ports.len(),
            engine.concurrency_limit(),
        );
    }
    let sink = output::stdout_sink(format, cli.show_closed);

    let summary = if cli.progress {
        let progress = Arc::new(ProgressSink::new(sink, ports.len()));
        let summary = engine
            .run(&ports, Arc::clone(&progress) as Arc<dyn ResultSink>)
            .await;
        progress.finish();
        summary
    } else {
        engine.run(&ports, sink).await
    };

    if summary.failed_probes > 0 {
        output::print_warning(&format!(
            "{} probes failed unexpectedly; their ports were reported closed",
            summary.failed_probes
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(crate::cli::normalize_args(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_config_from_defaults() {
        let config = scan_config(&cli(&["portprobe", "-banners"]), &Settings::default());
        assert_eq!(config.protocol, Protocol::Tcp);
        assert_eq!(config.concurrency_limit, 100);
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.read_timeout, Duration::from_secs(2));
        assert!(config.capture_banner);
    }

    #[test]
    fn test_udp_uses_udp_read_timeout() {
        let config = scan_config(&cli(&["portprobe", "-udp"]), &Settings::default());
        assert_eq!(config.protocol, Protocol::Udp);
        assert_eq!(config.read_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            threads: 7,
            connect_timeout_ms: 900,
            ..Settings::default()
        };

        let config = scan_config(&cli(&["portprobe", "-udp"]), &settings);
        assert_eq!(config.concurrency_limit, 7);
        assert_eq!(config.connect_timeout, Duration::from_millis(900));

        let config = scan_config(
            &cli(&["portprobe", "-threads", "3", "--connect-timeout", "100"]),
            &settings,
        );
        assert_eq!(config.concurrency_limit, 3);
        assert_eq!(config.connect_timeout, Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_invalid_range_aborts_before_scanning() {
        let err = execute(&cli(&["portprobe", "-ports", "80-20"])).await.unwrap_err();
        assert!(err.to_string().contains("80-20"));
    }

    #[tokio::test]
    async fn test_zero_threads_rejected() {
        let err = execute(&cli(&["portprobe", "-threads", "0", "-ports", "1-1"]))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("concurrency"));
    }
}
