//! Port-specific error types.
//!
//! Device-level failures, kept apart from the channel-level errors so the
//! channel can decide which of them it recovers from.

use thiserror::Error;

/// Errors that can occur while talking to a serial device.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device rejected the arguments of an operation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The device is not in an operable state (closed or released).
    #[error("Port is not open")]
    NotOpen,

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create an InvalidInput error from a message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }

    /// True for both our own `Timeout` and an OS-level `TimedOut` I/O error.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// Failures a best-effort write is allowed to swallow: the device was in
    /// the wrong state, or it refused the arguments.
    pub fn is_recoverable_on_write(&self) -> bool {
        matches!(self, Self::NotOpen | Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let err = PortError::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "Serial port not found: /dev/ttyUSB0");

        let err = PortError::invalid_input("empty buffer");
        assert_eq!(err.to_string(), "Invalid input: empty buffer");

        assert_eq!(PortError::NotOpen.to_string(), "Port is not open");
    }

    #[test]
    fn test_timeout_detection() {
        assert!(PortError::timeout(Duration::from_millis(500)).is_timeout());
        assert!(PortError::Io(std::io::Error::from(std::io::ErrorKind::TimedOut)).is_timeout());
        assert!(!PortError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)).is_timeout());
        assert!(!PortError::NotOpen.is_timeout());
    }

    #[test]
    fn test_write_recoverable_set() {
        assert!(PortError::NotOpen.is_recoverable_on_write());
        assert!(PortError::invalid_input("bad offset").is_recoverable_on_write());
        assert!(!PortError::timeout(Duration::from_millis(500)).is_recoverable_on_write());
        assert!(!PortError::not_found("COM9").is_recoverable_on_write());
    }
}
