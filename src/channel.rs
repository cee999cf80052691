//! The serial channel: one open device, text in and text out.
//!
//! A `PortChannel` owns its device handle exclusively. Writes are
//! best-effort, reads never block past the fixed timeout, and every
//! transport failure the channel recovers from is reported through an
//! outcome value instead of disappearing.

use crate::encoding::ByteEncoder;
use crate::error::{require_text, ChannelError, ChannelResult};
use crate::port::{PortError, PortSettings, SerialPortAdapter};
use crate::registry::{self, OpenOutcome};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Highest baud rate a channel accepts.
pub const MAX_BAUD_RATE: u32 = 128_000;

/// Baud rate used when the caller does not pick one.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Platform line separator substituted for every `\r` on read.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Result of a best-effort write.
#[derive(Debug)]
pub enum WriteOutcome {
    /// The encoded message went out.
    Written(usize),
    /// The encoder produced no bytes; nothing was sent.
    Empty,
    /// The channel has been closed; nothing was sent.
    NotOpen,
    /// The device refused the write because of its state or the arguments.
    /// The caller is not expected to act on this.
    Suppressed(PortError),
}

impl WriteOutcome {
    pub fn bytes_written(&self) -> usize {
        match self {
            Self::Written(n) => *n,
            _ => 0,
        }
    }
}

/// Result of a non-blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// No bytes were waiting (or the channel is closed).
    Nothing,
    /// Bytes were announced but the read timed out.
    TimedOut,
    /// Decoded text with `\r` replaced by [`LINE_SEPARATOR`].
    Data(String),
}

impl ReadOutcome {
    /// Text view of the outcome: `None` when nothing was waiting, an empty
    /// string after a timeout.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Nothing => None,
            Self::TimedOut => Some(String::new()),
            Self::Data(text) => Some(text),
        }
    }
}

/// Result of tearing a channel down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The device was closed and released.
    Closed,
    /// The channel had already been closed.
    AlreadyClosed,
    /// The registry had no live channel.
    NothingOpen,
}

/// Checks open arguments. Runs on every open request, before the registry
/// looks at its slot.
pub(crate) fn validate_open_args(port_name: &str, baud_rate: u32) -> ChannelResult<()> {
    require_text("port_name", port_name)?;
    if baud_rate > MAX_BAUD_RATE {
        return Err(ChannelError::out_of_range("baud_rate", baud_rate, MAX_BAUD_RATE));
    }
    Ok(())
}

/// Replace each carriage return with the platform line separator.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace('\r', LINE_SEPARATOR)
}

/// An open serial connection.
///
/// Obtained from a [`ChannelRegistry`](crate::registry::ChannelRegistry) or
/// from [`PortChannel::open`], which uses the process-wide registry.
pub struct PortChannel {
    port_name: String,
    baud_rate: u32,
    read_timeout: Duration,
    write_timeout: Duration,
    encoder: Arc<dyn ByteEncoder>,
    /// `Some` while open. Also serializes write/read/close on this channel.
    handle: Mutex<Option<Box<dyn SerialPortAdapter>>>,
}

impl PortChannel {
    pub(crate) fn from_adapter(
        settings: &PortSettings,
        port: Box<dyn SerialPortAdapter>,
        encoder: Arc<dyn ByteEncoder>,
    ) -> Self {
        Self {
            port_name: settings.port_name.clone(),
            baud_rate: settings.baud_rate,
            read_timeout: settings.read_timeout,
            write_timeout: settings.write_timeout,
            encoder,
            handle: Mutex::new(Some(port)),
        }
    }

    /// Open `port_name` through the process-wide registry.
    ///
    /// If a channel is already live it is returned as
    /// [`OpenOutcome::Existing`] and the arguments are only validated, not
    /// compared with it. Errors are those of [`ChannelRegistry::open`].
    ///
    /// [`ChannelRegistry::open`]: crate::registry::ChannelRegistry::open
    ///
    /// ```no_run
    /// use port_channel::PortChannel;
    ///
    /// if let Some(channel) = PortChannel::open("/dev/ttyUSB0", 115_200)?.into_channel() {
    ///     channel.write("AT\r")?;
    /// }
    /// # Ok::<(), port_channel::ChannelError>(())
    /// ```
    pub fn open(port_name: &str, baud_rate: u32) -> ChannelResult<OpenOutcome> {
        registry::global().open(port_name, baud_rate)
    }

    /// [`PortChannel::open`] at [`DEFAULT_BAUD_RATE`].
    pub fn open_default(port_name: &str) -> ChannelResult<OpenOutcome> {
        Self::open(port_name, DEFAULT_BAUD_RATE)
    }

    /// Tear down the channel held by the process-wide registry.
    pub fn close_global() -> CloseOutcome {
        registry::global().close()
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Whether the device handle is still held.
    pub fn is_open(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Encode `message` and send it.
    ///
    /// # Errors
    ///
    /// - `ChannelError::InvalidArgument` if `message` is empty or whitespace
    /// - `ChannelError::Transport` for device failures other than a bad
    ///   device state or rejected arguments (those yield
    ///   [`WriteOutcome::Suppressed`])
    pub fn write(&self, message: &str) -> ChannelResult<WriteOutcome> {
        require_text("message", message)?;

        let mut handle = self.handle.lock();
        let Some(port) = handle.as_mut() else {
            debug!(port = %self.port_name, "write on closed channel ignored");
            return Ok(WriteOutcome::NotOpen);
        };

        let bytes = match self.encoder.encode(message) {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Ok(WriteOutcome::Empty),
        };

        match port.write_bytes(&bytes) {
            Ok(n) => {
                debug!(port = %self.port_name, bytes = n, "wrote message");
                Ok(WriteOutcome::Written(n))
            }
            Err(e) if e.is_recoverable_on_write() => {
                debug!(port = %self.port_name, error = %e, "write suppressed");
                Ok(WriteOutcome::Suppressed(e))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read whatever is waiting, without blocking when nothing is.
    ///
    /// # Errors
    ///
    /// - `ChannelError::Transport` for read failures other than a timeout
    pub fn read(&self) -> ChannelResult<ReadOutcome> {
        let mut handle = self.handle.lock();
        let Some(port) = handle.as_mut() else {
            return Ok(ReadOutcome::Nothing);
        };

        match port.bytes_to_read() {
            Some(n) if n > 0 => {}
            _ => return Ok(ReadOutcome::Nothing),
        }

        let mut buffer = vec![0u8; port.read_buffer_size().max(1)];
        match port.read_bytes(&mut buffer) {
            Ok(n) => {
                debug!(port = %self.port_name, bytes = n, "read bytes");
                let text = self.encoder.decode_ascii(&buffer, n);
                Ok(ReadOutcome::Data(normalize_line_endings(&text)))
            }
            Err(e) if e.is_timeout() => {
                debug!(port = %self.port_name, "read timed out");
                Ok(ReadOutcome::TimedOut)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Close and release the device. Safe to call more than once.
    ///
    /// A registry treats a channel closed this way as gone, so the next open
    /// creates a fresh one.
    pub fn close(&self) -> CloseOutcome {
        let Some(mut port) = self.handle.lock().take() else {
            return CloseOutcome::AlreadyClosed;
        };
        if let Err(e) = port.close() {
            warn!(port = %self.port_name, error = %e, "error while closing port");
        }
        info!(port = %self.port_name, "channel closed");
        CloseOutcome::Closed
    }
}

impl Drop for PortChannel {
    fn drop(&mut self) {
        if let Some(mut port) = self.handle.get_mut().take() {
            let _ = port.close();
            debug!(port = %self.port_name, "channel released on drop");
        }
    }
}

impl fmt::Debug for PortChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortChannel")
            .field("port_name", &self.port_name)
            .field("baud_rate", &self.baud_rate)
            .field("open", &self.handle.try_lock().map(|h| h.is_some()))
            .finish()
    }
}
