//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the resolved form of a `"start-end"` specification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Port 0 was given where a real port is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("port {0} is out of valid range (1-65535)")]
pub struct PortOutOfRange(pub u16);

impl TryFrom<u16> for Port {
    type Error = PortOutOfRange;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortOutOfRange(value))
    }
}

/// Which rule a rejected range specification broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeViolation {
    /// Not exactly two tokens separated by a single `-`.
    Format,
    /// A token is not an integer.
    NotANumber,
    /// Start is below 1.
    StartTooLow,
    /// End is above 65535.
    EndTooHigh,
    /// Start is greater than end.
    Reversed,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Format => "expected two port numbers separated by '-'",
            Self::NotANumber => "port bounds must be integers",
            Self::StartTooLow => "start port must be at least 1",
            Self::EndTooHigh => "end port must be at most 65535",
            Self::Reversed => "start port is greater than end port",
        };
        f.write_str(msg)
    }
}

/// A port range specification was rejected.
///
/// Carries the offending input verbatim so the caller can report it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid port range '{input}': {reason}")]
pub struct InvalidRangeError {
    pub input: String,
    pub reason: RangeViolation,
}

impl InvalidRangeError {
    fn new(input: &str, reason: RangeViolation) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// An inclusive, non-empty, ascending range of ports.
///
/// Built once by [`PortRange::resolve`] and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Resolve a `"start-end"` specification into a port range.
    ///
    /// Both tokens must parse as integers, `1 <= start`, `end <= 65535`
    /// and `start <= end`. No partial range is ever returned.
    pub fn resolve(spec: &str) -> Result<Self, InvalidRangeError> {
        let (start, end) = match spec.split_once('-') {
            Some((start, end)) if !end.contains('-') => (start, end),
            _ => return Err(InvalidRangeError::new(spec, RangeViolation::Format)),
        };

        // Wider than u16 so that "0" and "65536" are reported as bound
        // violations instead of parse failures.
        let start: i64 = start
            .parse()
            .map_err(|_| InvalidRangeError::new(spec, RangeViolation::NotANumber))?;
        let end: i64 = end
            .parse()
            .map_err(|_| InvalidRangeError::new(spec, RangeViolation::NotANumber))?;

        if start < i64::from(Port::MIN) {
            return Err(InvalidRangeError::new(spec, RangeViolation::StartTooLow));
        }
        if end > i64::from(Port::MAX) {
            return Err(InvalidRangeError::new(spec, RangeViolation::EndTooHigh));
        }
        if start > end {
            return Err(InvalidRangeError::new(spec, RangeViolation::Reversed));
        }

        // Both bounds are within 1..=65535 here.
        Ok(Self {
            start: Port(start as u16),
            end: Port(end as u16),
        })
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// First port of the range.
    pub const fn start(&self) -> Port {
        self.start
    }

    /// Last port of the range.
    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    /// Always false: a resolved range holds at least one port.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }

    /// Collect the ports into a vector.
    pub fn to_ports(&self) -> Vec<Port> {
        self.iter().collect()
    }
}

impl FromStr for PortRange {
    type Err = InvalidRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(range: &PortRange) -> Vec<u16> {
        range.iter().map(Port::as_u16).collect()
    }

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
    }

    #[test]
    fn test_port_serde_rejects_zero() {
        assert_eq!(serde_json::to_string(&Port(443)).unwrap(), "443");
        assert_eq!(serde_json::from_str::<Port>("443").unwrap(), Port(443));
        assert!(serde_json::from_str::<Port>("0").is_err());
    }

    #[test]
    fn test_resolve_simple_range() {
        let range = PortRange::resolve("20-25").unwrap();
        assert_eq!(raw(&range), vec![20, 21, 22, 23, 24, 25]);
        assert_eq!(range.len(), 6);
    }

    #[test]
    fn test_resolve_single_port() {
        let range = PortRange::resolve("22-22").unwrap();
        assert_eq!(raw(&range), vec![22]);
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_resolve_full_range() {
        let range = PortRange::resolve("1-65535").unwrap();
        let ports = range.to_ports();
        assert_eq!(ports.len(), 65535);
        assert_eq!(ports.first().map(|p| p.as_u16()), Some(1));
        assert_eq!(ports.last().map(|p| p.as_u16()), Some(65535));
        assert!(ports.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_resolve_length_matches_bounds() {
        for (start, end) in [(1u16, 1u16), (80, 443), (1000, 1024), (65000, 65535)] {
            let range = PortRange::resolve(&format!("{}-{}", start, end)).unwrap();
            assert_eq!(range.len(), usize::from(end - start) + 1);
            assert_eq!(range.start().as_u16(), start);
            assert_eq!(range.end().as_u16(), end);
        }
    }

    #[test]
    fn test_resolve_rejects_bad_bounds() {
        let err = PortRange::resolve("80-20").unwrap_err();
        assert_eq!(err.reason, RangeViolation::Reversed);

        let err = PortRange::resolve("0-100").unwrap_err();
        assert_eq!(err.reason, RangeViolation::StartTooLow);

        let err = PortRange::resolve("1-65536").unwrap_err();
        assert_eq!(err.reason, RangeViolation::EndTooHigh);
    }

    #[test]
    fn test_resolve_rejects_bad_format() {
        for input in ["", "80", "1-2-3", "-", "a-b", "1-", "-5", "1 - 5", "1,2"] {
            let err = PortRange::resolve(input).unwrap_err();
            assert_eq!(err.input, input);
        }
        assert_eq!(
            PortRange::resolve("abc").unwrap_err().reason,
            RangeViolation::Format
        );
        assert_eq!(
            PortRange::resolve("x-10").unwrap_err().reason,
            RangeViolation::NotANumber
        );
    }

    #[test]
    fn test_error_names_input() {
        let err: InvalidRangeError = "80-20".parse::<PortRange>().unwrap_err();
        assert!(err.to_string().contains("'80-20'"));
    }
}
