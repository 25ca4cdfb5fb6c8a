//! Error types for portprobe.
//!
//! Uses `thiserror` for ergonomic error definitions. Probe-level errors are
//! classified into a result and never abort a scan; configuration errors
//! are reported once before any probe runs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single probe did not find its port open.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ScanError {
    /// Classify an I/O error from a connect, send or receive call.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                Self::Unreachable(err.to_string())
            }
            _ => Self::Io(err),
        }
    }
}

/// Result type alias for probe operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors in scan configuration or the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_io_errors() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(matches!(ScanError::from_io(refused), ScanError::ConnectionRefused));

        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert!(matches!(ScanError::from_io(timed_out), ScanError::Timeout));

        let other = io::Error::from(io::ErrorKind::AddrNotAvailable);
        assert!(matches!(ScanError::from_io(other), ScanError::Io(_)));
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::ZeroTimeout("connect").to_string(),
            "connect timeout must be greater than zero"
        );
    }
}
