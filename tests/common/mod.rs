//! Shared test utilities for channel tests.
//!
//! Mock-backed openers so registries can be driven without hardware.

#![allow(dead_code)]

use port_channel::port::{MockSerialPort, PortError, PortSettings, SerialPortAdapter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Signature every registry opener has.
pub type OpenResult = Result<Box<dyn SerialPortAdapter>, PortError>;

/// Opener that hands the registry a clone of `mock`.
pub fn mock_opener(mock: &MockSerialPort) -> impl FnOnce(&PortSettings) -> OpenResult {
    let mock = mock.clone();
    move |_: &PortSettings| -> OpenResult { Ok(Box::new(mock)) }
}

/// Opener that counts how often it runs, then opens `mock`.
pub fn counting_opener(
    mock: &MockSerialPort,
    counter: &Arc<AtomicUsize>,
) -> impl FnOnce(&PortSettings) -> OpenResult {
    let mock = mock.clone();
    let counter = Arc::clone(counter);
    move |_: &PortSettings| -> OpenResult {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(mock))
    }
}

/// Opener that fails the way a missing device does.
pub fn missing_device(settings: &PortSettings) -> OpenResult {
    Err(PortError::not_found(&settings.port_name))
}

/// Opener that fails with an OS-level I/O error.
pub fn busy_device(_: &PortSettings) -> OpenResult {
    Err(PortError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "device busy",
    )))
}
