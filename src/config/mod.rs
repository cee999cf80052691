//! Configuration module for the `port-channel` binary.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `PORT_CHANNEL_CONFIG` environment variable (explicit path)
//! 2. `./port-channel.toml` (current directory)
//! 3. `config.toml` in the platform config directory
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is: `PORT_CHANNEL_<SECTION>_<KEY>`
//!
//! Examples:
//! - `PORT_CHANNEL_SERIAL_DEFAULT_PORT=/dev/ttyUSB0`
//! - `PORT_CHANNEL_SERIAL_DEFAULT_BAUD=19200`
//! - `PORT_CHANNEL_LOGGING_LEVEL=debug`
//!
//! Read and write timeouts are fixed and have no configuration key.
//!
//! # Example
//!
//! ```rust,ignore
//! use port_channel::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! println!("Default baud: {}", loader.config().serial.default_baud);
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, SerialConfig};
