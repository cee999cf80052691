//! Errors raised while loading, checking or saving `port-channel.toml`.

use std::path::PathBuf;
use thiserror::Error;

/// Something wrong with the configuration file or its overrides.
///
/// Value errors carry the offending value and the key it was read from, so
/// the binary can report them without re-reading the file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `serial.default_baud` above what a channel accepts.
    #[error("serial.default_baud = {value} exceeds the maximum of {max}")]
    BaudOutOfRange { value: u32, max: u32 },

    /// `serial.default_port` present but blank.
    #[error("serial.default_port = {value:?} is blank")]
    BlankPort { value: String },

    /// `logging.level` that `EnvFilter` refuses.
    #[error("logging.level = {value:?} is not a valid filter: {reason}")]
    LogLevel { value: String, reason: String },

    /// A `PORT_CHANNEL_*` variable that does not parse for its key.
    #[error("{var}={value:?}: {reason}")]
    Override {
        var: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn overriding(
        var: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Override {
            var: var.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Dotted config key the error refers to, when it is about one value.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::BaudOutOfRange { .. } => Some("serial.default_baud"),
            Self::BlankPort { .. } => Some("serial.default_port"),
            Self::LogLevel { .. } => Some("logging.level"),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
