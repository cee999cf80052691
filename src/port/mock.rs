//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates serial port behavior without
//! requiring actual hardware. Clones share state, so a test can keep one
//! handle for inspection while the channel owns another.

use super::error::PortError;
use super::traits::{SerialPortAdapter, IO_TIMEOUT, READ_BUFFER_SIZE};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug)]
struct MockPortState {
    /// Bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Every successful write, in order.
    write_log: Vec<Vec<u8>>,
    /// Echo writes back into the read queue.
    loopback: bool,
    /// Next read/write times out.
    should_timeout: bool,
    /// Next read/write fails with this error.
    next_error: Option<PortError>,
    /// Report `None` from `bytes_to_read`.
    hide_available: bool,
    read_buffer_size: usize,
    closed: bool,
}

impl Default for MockPortState {
    fn default() -> Self {
        Self {
            read_queue: VecDeque::new(),
            write_log: Vec::new(),
            loopback: false,
            should_timeout: false,
            next_error: None,
            hide_available: false,
            read_buffer_size: READ_BUFFER_SIZE,
            closed: false,
        }
    }
}

/// Mock serial port implementation for testing.
///
/// # Example
/// ```
/// use port_channel::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hello, World!");
///
/// let mut buffer = [0u8; 13];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"Hello, World!");
///
/// port.write_bytes(b"Response").unwrap();
/// assert_eq!(port.get_write_log(), vec![b"Response".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState::default())),
        }
    }

    /// Create a mock that echoes every write back as readable bytes.
    pub fn loopback(name: impl Into<String>) -> Self {
        let port = Self::new(name);
        port.state.lock().loopback = true;
        port
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Make the next read or write time out.
    pub fn set_should_timeout(&self, should_timeout: bool) {
        self.state.lock().should_timeout = should_timeout;
    }

    /// Make the next read or write fail with `error`.
    pub fn fail_next(&self, error: PortError) {
        self.state.lock().next_error = Some(error);
    }

    /// Pretend the device cannot report how many bytes are waiting.
    pub fn hide_available_bytes(&self, hide: bool) {
        self.state.lock().hide_available = hide;
    }

    pub fn set_read_buffer_size(&self, size: usize) {
        self.state.lock().read_buffer_size = size;
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// Whether `close` has been called on any clone of this port.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn check_operable(state: &mut MockPortState) -> Result<(), PortError> {
        if state.closed {
            return Err(PortError::NotOpen);
        }
        if let Some(err) = state.next_error.take() {
            return Err(err);
        }
        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(IO_TIMEOUT));
        }
        Ok(())
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        Self::check_operable(&mut state)?;

        state.write_log.push(data.to_vec());
        if state.loopback {
            state.read_queue.extend(data);
        }
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        Self::check_operable(&mut state)?;

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            // A real port with nothing pending blocks until its timeout
            Err(PortError::timeout(IO_TIMEOUT))
        } else {
            Ok(bytes_read)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bytes_to_read(&self) -> Option<usize> {
        let state = self.state.lock();
        if state.hide_available {
            None
        } else {
            Some(state.read_queue.len())
        }
    }

    fn read_buffer_size(&self) -> usize {
        self.state.lock().read_buffer_size
    }

    fn close(&mut self) -> Result<(), PortError> {
        self.state.lock().closed = true;
        Ok(())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
