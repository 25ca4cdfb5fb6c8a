//! Core type definitions using newtype patterns for type safety.

mod port;
mod target;

pub use port::{InvalidRangeError, Port, PortOutOfRange, PortRange, RangeViolation};
pub use target::{resolve_host, ScanTarget, TargetError};
