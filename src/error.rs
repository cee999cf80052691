//! Errors surfaced to channel callers.
//!
//! Argument validation failures are always hard errors. Transport failures
//! only show up here when the channel does not recover from them; the
//! recovered ones are reported through the outcome types in `channel`.

use crate::port::PortError;
use thiserror::Error;

/// Channel-level error type.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A required text argument was empty or whitespace only.
    #[error("Argument '{param}' must not be empty or whitespace")]
    InvalidArgument { param: &'static str },

    /// A numeric argument fell outside its permitted range.
    #[error("Argument '{param}' is out of range: {value} (allowed 0..={max})")]
    OutOfRange {
        param: &'static str,
        value: u64,
        max: u64,
    },

    /// A device failure the channel does not recover from.
    #[error("Transport failure: {0}")]
    Transport(#[from] PortError),
}

impl ChannelError {
    pub fn invalid_argument(param: &'static str) -> Self {
        Self::InvalidArgument { param }
    }

    pub fn out_of_range(param: &'static str, value: impl Into<u64>, max: impl Into<u64>) -> Self {
        Self::OutOfRange {
            param,
            value: value.into(),
            max: max.into(),
        }
    }
}

/// Convenient Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Fails with `InvalidArgument` when `value` is empty or whitespace only.
pub(crate) fn require_text(param: &'static str, value: &str) -> ChannelResult<()> {
    if value.trim().is_empty() {
        Err(ChannelError::invalid_argument(param))
    } else {
        Ok(())
    }
}
