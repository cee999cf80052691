//! Synchronous serial port implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own
//! `SerialPortAdapter` trait so the channel can be exercised against mocks.

use super::error::PortError;
use super::traits::{PortSettings, SerialPortAdapter};
use std::io::{Read, Write};

/// Synchronous serial port implementation wrapping `serialport::SerialPort`.
pub struct SyncSerialPort {
    /// The underlying serial port implementation.
    port: Box<dyn serialport::SerialPort>,
    /// The port name/path for identification.
    name: String,
}

impl SyncSerialPort {
    /// Open a serial port with the given settings, framed 8N1 without flow
    /// control.
    ///
    /// # Example
    /// ```no_run
    /// use port_channel::port::{PortSettings, SyncSerialPort};
    ///
    /// let port = SyncSerialPort::open(&PortSettings::new("/dev/ttyUSB0", 9600))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(settings: &PortSettings) -> Result<Self, PortError> {
        // serialport carries a single timeout for both directions
        let timeout = settings.read_timeout.max(settings.write_timeout);

        let port = serialport::new(settings.port_name.as_str(), settings.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .flow_control(serialport::FlowControl::None)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(&settings.port_name),
                serialport::ErrorKind::InvalidInput => PortError::invalid_input(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: settings.port_name.clone(),
        })
    }

    /// Boxed form of [`SyncSerialPort::open`], suitable as a registry opener.
    pub fn open_boxed(settings: &PortSettings) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(Self::open(settings)?))
    }
}

fn map_io_error(err: std::io::Error, port: &dyn serialport::SerialPort) -> PortError {
    match err.kind() {
        std::io::ErrorKind::TimedOut => PortError::timeout(port.timeout()),
        std::io::ErrorKind::InvalidInput => PortError::invalid_input(err.to_string()),
        _ => PortError::Io(err),
    }
}

impl SerialPortAdapter for SyncSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        match self.port.write_all(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => Err(map_io_error(e, &*self.port)),
        }
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) => Err(map_io_error(e, &*self.port)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bytes_to_read(&self) -> Option<usize> {
        self.port.bytes_to_read().ok().map(|n| n as usize)
    }

    fn close(&mut self) -> Result<(), PortError> {
        // Drain queued output; the descriptor itself closes on drop.
        self.port
            .flush()
            .map_err(|e| map_io_error(e, &*self.port))
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate().ok())
            .finish()
    }
}

/// Names of the serial ports currently present on the system.
pub fn available_ports() -> Result<Vec<String>, PortError> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
