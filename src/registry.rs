//! At most one live channel.
//!
//! `ChannelRegistry` holds the single channel slot. The whole open sequence
//! (check slot, open device, store channel) runs under the slot lock, so
//! concurrent openers never construct two devices. The process-wide registry
//! behind [`PortChannel::open`] lives in a `OnceCell`.

use crate::channel::{validate_open_args, CloseOutcome, PortChannel};
use crate::encoding::{AsciiEncoder, ByteEncoder};
use crate::error::ChannelResult;
use crate::port::{PortError, PortSettings, SerialPortAdapter, SyncSerialPort};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

static GLOBAL: OnceCell<ChannelRegistry> = OnceCell::new();

/// The process-wide registry, created with the ASCII encoder on first use
/// unless [`install_global`] ran earlier.
pub fn global() -> &'static ChannelRegistry {
    GLOBAL.get_or_init(ChannelRegistry::new)
}

/// Install `registry` as the process-wide registry.
///
/// Fails, handing the registry back, once the global one exists.
pub fn install_global(registry: ChannelRegistry) -> Result<&'static ChannelRegistry, ChannelRegistry> {
    GLOBAL.set(registry)?;
    Ok(global())
}

/// What an open request produced.
#[derive(Debug)]
pub enum OpenOutcome {
    /// A new channel was created for this request.
    Opened(Arc<PortChannel>),
    /// A channel was already live; it is returned unchanged.
    Existing(Arc<PortChannel>),
    /// The device could not be opened. Nothing was stored.
    Unavailable(PortError),
}

impl OpenOutcome {
    /// The channel, or `None` when the device was unavailable.
    pub fn into_channel(self) -> Option<Arc<PortChannel>> {
        match self {
            Self::Opened(channel) | Self::Existing(channel) => Some(channel),
            Self::Unavailable(_) => None,
        }
    }

    pub fn channel(&self) -> Option<&Arc<PortChannel>> {
        match self {
            Self::Opened(channel) | Self::Existing(channel) => Some(channel),
            Self::Unavailable(_) => None,
        }
    }
}

/// Owner of the single channel slot.
pub struct ChannelRegistry {
    slot: Mutex<Option<Arc<PortChannel>>>,
    encoder: Arc<dyn ByteEncoder>,
}

impl ChannelRegistry {
    /// Registry whose channels use the ASCII encoder.
    pub fn new() -> Self {
        Self::with_encoder(Arc::new(AsciiEncoder))
    }

    /// Registry whose channels encode outgoing text with `encoder`.
    pub fn with_encoder(encoder: Arc<dyn ByteEncoder>) -> Self {
        Self {
            slot: Mutex::new(None),
            encoder,
        }
    }

    /// Open a hardware port, or return the live channel.
    ///
    /// # Errors
    ///
    /// - `ChannelError::InvalidArgument` if `port_name` is empty or whitespace
    /// - `ChannelError::OutOfRange` if `baud_rate` exceeds 128000
    /// - `ChannelError::Transport` if the device rejects the settings
    ///
    /// Any other device failure (missing, busy, permission denied) yields
    /// [`OpenOutcome::Unavailable`].
    pub fn open(&self, port_name: &str, baud_rate: u32) -> ChannelResult<OpenOutcome> {
        self.open_with(port_name, baud_rate, SyncSerialPort::open_boxed)
    }

    /// [`ChannelRegistry::open`] with a caller-supplied device opener.
    ///
    /// `opener` only runs when no live channel exists.
    pub fn open_with<F>(&self, port_name: &str, baud_rate: u32, opener: F) -> ChannelResult<OpenOutcome>
    where
        F: FnOnce(&PortSettings) -> Result<Box<dyn SerialPortAdapter>, PortError>,
    {
        validate_open_args(port_name, baud_rate)?;

        let mut slot = self.slot.lock();
        if let Some(existing) = slot.as_ref() {
            if existing.is_open() {
                debug!(
                    requested = port_name,
                    port = existing.port_name(),
                    "returning live channel"
                );
                return Ok(OpenOutcome::Existing(Arc::clone(existing)));
            }
        }
        // Anything left in the slot was closed directly and counts as gone.
        *slot = None;

        let settings = PortSettings::new(port_name, baud_rate);
        match opener(&settings) {
            Ok(port) => {
                let channel = Arc::new(PortChannel::from_adapter(
                    &settings,
                    port,
                    Arc::clone(&self.encoder),
                ));
                *slot = Some(Arc::clone(&channel));
                info!(port = port_name, baud_rate, "channel opened");
                Ok(OpenOutcome::Opened(channel))
            }
            // Rejected settings are a caller problem, not a missing device.
            Err(e @ PortError::InvalidInput(_)) => {
                warn!(port = port_name, baud_rate, error = %e, "device rejected settings");
                Err(e.into())
            }
            Err(e) => {
                warn!(port = port_name, baud_rate, error = %e, "port unavailable");
                Ok(OpenOutcome::Unavailable(e))
            }
        }
    }

    /// The live channel, if any.
    pub fn current(&self) -> Option<Arc<PortChannel>> {
        self.slot
            .lock()
            .as_ref()
            .filter(|channel| channel.is_open())
            .map(Arc::clone)
    }

    /// Close the live channel and empty the slot.
    pub fn close(&self) -> CloseOutcome {
        let channel = self.slot.lock().take();
        match channel.map(|c| c.close()) {
            Some(CloseOutcome::Closed) => CloseOutcome::Closed,
            _ => CloseOutcome::NothingOpen,
        }
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("encoder", &self.encoder)
            .field("current", &self.current().map(|c| c.port_name().to_string()))
            .finish()
    }
}
