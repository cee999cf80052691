//! Port abstraction layer for serial communication.
//!
//! Provides the device trait the channel talks to, the `serialport`-backed
//! implementation, and a mock for tests.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::MockSerialPort;
pub use sync_port::{available_ports, SyncSerialPort};
pub use traits::*;
