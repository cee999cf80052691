//! Port Channel Library
//!
//! A single serial connection per process: open a named port at a bounded
//! baud rate, write text as encoded bytes, and read waiting bytes back as
//! text, with fixed 500 ms timeouts so no call blocks indefinitely.
//!
//! # Modules
//!
//! - `channel`: The `PortChannel` and its write/read/close outcomes
//! - `registry`: The single-channel slot and the process-wide registry
//! - `encoding`: Text to wire-byte translation
//! - `port`: Port abstraction layer for serial communication
//! - `error`: Channel-level errors
//! - `config`: Configuration management with TOML support
//! - `logging`: Tracing subscriber setup

pub mod channel;
pub mod config;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod port;
pub mod registry;

// Re-export commonly used types for convenience
pub use channel::{
    CloseOutcome, PortChannel, ReadOutcome, WriteOutcome, DEFAULT_BAUD_RATE, LINE_SEPARATOR,
    MAX_BAUD_RATE,
};
pub use encoding::{AsciiEncoder, ByteEncoder, EncodingKind, Utf8Encoder};
pub use error::{ChannelError, ChannelResult};
pub use port::{MockSerialPort, PortError, PortSettings, SerialPortAdapter, SyncSerialPort};
pub use registry::{ChannelRegistry, OpenOutcome};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
