//! Core traits for serial port abstraction.
//!
//! Defines the `SerialPortAdapter` trait that lets the channel drive both real
//! serial ports and mock implementations.

use super::error::PortError;
use std::time::Duration;

/// Fixed read and write timeout applied to every device the channel opens.
pub const IO_TIMEOUT: Duration = Duration::from_millis(500);

/// Receive-buffer capacity reported by devices that cannot report their own.
pub const READ_BUFFER_SIZE: usize = 4096;

/// Parameters a device is opened with.
///
/// The channel only varies the name and baud rate; framing is always 8N1
/// without flow control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    /// System path of the device (e.g. "/dev/ttyUSB0" or "COM3").
    pub port_name: String,

    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read timeout.
    pub read_timeout: Duration,

    /// Write timeout.
    pub write_timeout: Duration,
}

impl PortSettings {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            read_timeout: IO_TIMEOUT,
            write_timeout: IO_TIMEOUT,
        }
    }
}

/// Trait for serial port I/O operations.
///
/// Implemented by `SyncSerialPort` for hardware and by `MockSerialPort` for
/// tests.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Get the current bytes available to read.
    ///
    /// Returns `None` if the operation is not supported or cannot be determined.
    fn bytes_to_read(&self) -> Option<usize> {
        None
    }

    /// Capacity of the receive buffer, used to size read buffers.
    fn read_buffer_size(&self) -> usize {
        READ_BUFFER_SIZE
    }

    /// Close the device. The adapter is dropped right after this returns.
    fn close(&mut self) -> Result<(), PortError> {
        Ok(())
    }
}
