//! Application settings.
//!
//! An optional JSON file supplies defaults that command-line flags
//! override. The default location follows the XDG Base Directory layout
//! (`~/.config/portprobe/settings.json` on Linux).

use crate::error::{ConfigError, ConfigResult};
use crate::output::OutputFormat;
use crate::scanner::traits::{
    Protocol, DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TCP_READ_TIMEOUT,
    DEFAULT_UDP_READ_TIMEOUT,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_FILE: &str = "settings.json";

/// Default path of the settings file, if a config directory exists.
pub fn default_settings_path() -> ConfigResult<PathBuf> {
    let project =
        ProjectDirs::from("", "", "portprobe").ok_or(ConfigError::DirectoryNotFound)?;
    Ok(project.config_dir().join(SETTINGS_FILE))
}

/// Scan defaults loaded from the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Probes in flight at once.
    pub threads: usize,
    /// TCP connect / UDP dial timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// TCP banner read timeout in milliseconds.
    pub tcp_read_timeout_ms: u64,
    /// UDP response read timeout in milliseconds.
    pub udp_read_timeout_ms: u64,
    /// Output format.
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: DEFAULT_CONCURRENCY,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            tcp_read_timeout_ms: DEFAULT_TCP_READ_TIMEOUT.as_millis() as u64,
            udp_read_timeout_ms: DEFAULT_UDP_READ_TIMEOUT.as_millis() as u64,
            output: OutputFormat::Plain,
        }
    }
}

impl Settings {
    /// Load settings from an explicit path, or from the default location.
    ///
    /// A missing default file yields the built-in defaults; a missing or
    /// malformed explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match default_settings_path() {
            Ok(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Read timeout for the given protocol.
    pub fn read_timeout(&self, protocol: Protocol) -> Duration {
        match protocol {
            Protocol::Tcp => Duration::from_millis(self.tcp_read_timeout_ms),
            Protocol::Udp => Duration::from_millis(self.udp_read_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.threads, 100);
        assert_eq!(settings.connect_timeout(), Duration::from_millis(500));
        assert_eq!(settings.read_timeout(Protocol::Tcp), Duration::from_secs(2));
        assert_eq!(settings.read_timeout(Protocol::Udp), Duration::from_secs(1));
        assert_eq!(settings.output, OutputFormat::Plain);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"threads": 250, "output": "json"}}"#).unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.threads, 250);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.connect_timeout_ms, 500);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "threads = 10").unwrap();

        assert!(matches!(
            Settings::load_from(file.path()),
            Err(ConfigError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(matches!(
            Settings::load(Some(path.as_path())),
            Err(ConfigError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
